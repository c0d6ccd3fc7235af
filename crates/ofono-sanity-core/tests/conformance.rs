//! End-to-end conformance runs against recorded bus sessions.

use std::collections::BTreeMap;

use ofono_sanity_core::replay::{RecordedModem, Recording, ReplayBus};
use ofono_sanity_core::{
    CallerExpectations, Discrepancy, ModemOutcome, ModemState, ObjectKind, PowerState, PropValue,
    PropertySnapshot, classify, run_all,
};

/// Builds a modem that reports exactly what its profile requires.
fn conformant_modem(path: &str, variant: &str, online: bool, sim_present: bool) -> RecordedModem {
    let power = if online {
        PowerState::Online
    } else {
        PowerState::Offline
    };
    let state = ModemState::new(variant, power, sim_present);
    let profile = classify(&state);

    let mut modem = PropertySnapshot::new();
    modem.push("Revision", "M9615A-CEFWMAZM");
    match profile.scalar.identity {
        Some(id) => modem.push("Serial", id.serial),
        None => modem.push("Serial", "353918052290763"),
    }
    modem.push("Model", "Fake Modem Model");
    modem.push(
        "Features",
        profile
            .required_features
            .iter()
            .map(|s| (*s).to_owned())
            .collect::<Vec<_>>(),
    );
    modem.push("Online", online);
    modem.push("Type", "hardware");
    modem.push(
        "Interfaces",
        profile
            .required_interfaces
            .iter()
            .map(|s| (*s).to_owned())
            .collect::<Vec<_>>(),
    );
    modem.push("Emergency", false);
    modem.push("Manufacturer", "Fake Manufacturer");
    modem.push("Powered", true);
    modem.push("Lockdown", false);

    let mut sim = PropertySnapshot::new();
    if sim_present {
        sim.push("Present", true);
        sim.push("FixedDialing", false);
        sim.push("BarredDialing", false);
        sim.push(
            "SubscriberNumbers",
            vec![
                profile
                    .scalar
                    .identity
                    .map_or("15551234567".to_owned(), |id| {
                        id.subscriber_number.to_owned()
                    }),
            ],
        );
        sim.push("LockedPins", Vec::<String>::new());
        sim.push("PinRequired", "none");
        sim.push("Retries", PropValue::Opaque("a{sy}".to_owned()));
        if let Some(id) = profile.scalar.identity {
            sim.push("CardIdentifier", id.card_identifier);
            sim.push("MobileCountryCode", id.mobile_country_code);
            sim.push("MobileNetworkCode", id.mobile_network_code);
            sim.push("SubscriberIdentity", id.subscriber_identity);
        }
    } else {
        sim.push("Present", false);
    }

    let mut volume = PropertySnapshot::new();
    volume.push("MicrophoneVolume", 0i64);
    volume.push("SpeakerVolume", 0i64);
    volume.push("Muted", profile.scalar.muted);

    let mut voice = PropertySnapshot::new();
    voice.push(
        "EmergencyNumbers",
        ["112", "911", "999", "110", "118", "119", "000", "08"]
            .iter()
            .map(|s| (*s).to_owned())
            .collect::<Vec<_>>(),
    );

    let mut objects = BTreeMap::new();
    objects.insert(ObjectKind::Modem, modem);
    objects.insert(ObjectKind::SimManager, sim);
    objects.insert(ObjectKind::CallVolume, volume);
    objects.insert(ObjectKind::VoiceCallManager, voice);
    RecordedModem {
        path: path.to_owned(),
        objects,
    }
}

fn single_modem_bus(modem: RecordedModem) -> ReplayBus {
    let mut rec = Recording::new();
    rec.push(modem);
    ReplayBus::new(rec)
}

#[test]
fn goldfish_online_with_sim_passes_end_to_end() {
    let bus = single_modem_bus(conformant_modem("/ril_0", "goldfish", true, true));
    let summary = run_all(&bus, "goldfish", &CallerExpectations::default()).unwrap();
    assert!(summary.passed(), "{summary:?}");

    let report = summary.reports().next().unwrap();
    // Beyond the presence record, Serial must be held to the emulator literal.
    assert!(report
        .checks
        .iter()
        .filter(|c| c.property == "Serial")
        .any(|c| c.expected == "\"000000000000000\""));
    let mcc = report
        .checks
        .iter()
        .find(|c| c.property == "MobileCountryCode")
        .unwrap();
    assert!(mcc.passed());
}

#[test]
fn standard_variant_passes_all_four_states() {
    for (online, sim) in [(true, true), (true, false), (false, true), (false, false)] {
        let bus = single_modem_bus(conformant_modem("/ril_0", "mako", online, sim));
        let summary = run_all(&bus, "mako", &CallerExpectations::default()).unwrap();
        assert!(
            summary.passed(),
            "mako online={online} sim={sim}: {:?}",
            summary
                .reports()
                .flat_map(|r| r.failures())
                .collect::<Vec<_>>()
        );
    }
}

#[test]
fn krillin_passes_all_four_states() {
    for (online, sim) in [(true, true), (true, false), (false, true), (false, false)] {
        let bus = single_modem_bus(conformant_modem("/ril_0", "krillin", online, sim));
        let summary = run_all(&bus, "krillin", &CallerExpectations::default()).unwrap();
        assert!(
            summary.passed(),
            "krillin online={online} sim={sim}: {:?}",
            summary
                .reports()
                .flat_map(|r| r.failures())
                .collect::<Vec<_>>()
        );
    }
}

#[test]
fn krillin_offline_accepts_empty_feature_list() {
    let modem = conformant_modem("/ril_0", "krillin", false, false);
    let features = modem
        .objects
        .get(&ObjectKind::Modem)
        .and_then(|s| s.get("Features"))
        .and_then(PropValue::as_str_list)
        .unwrap();
    assert!(features.is_empty());
    let bus = single_modem_bus(modem);
    let summary = run_all(&bus, "krillin", &CallerExpectations::default()).unwrap();
    assert!(summary.passed());
}

#[test]
fn reported_superset_still_passes() {
    let mut modem = conformant_modem("/ril_0", "mako", true, true);
    let snapshot = modem.objects.get_mut(&ObjectKind::Modem).unwrap();
    let mut rebuilt = PropertySnapshot::new();
    for key in snapshot.keys().map(str::to_owned).collect::<Vec<_>>() {
        match key.as_str() {
            "Features" => {
                let mut features = snapshot
                    .get("Features")
                    .and_then(PropValue::as_str_list)
                    .unwrap()
                    .to_vec();
                features.push("tty".to_owned());
                rebuilt.push("Features", features);
            }
            "Interfaces" => {
                let mut ifaces = snapshot
                    .get("Interfaces")
                    .and_then(PropValue::as_str_list)
                    .unwrap()
                    .to_vec();
                ifaces.push("org.ofono.CellBroadcast".to_owned());
                rebuilt.push("Interfaces", ifaces);
            }
            _ => rebuilt.push(key.clone(), snapshot.get(&key).unwrap().clone()),
        }
    }
    *snapshot = rebuilt;
    let bus = single_modem_bus(modem);
    let summary = run_all(&bus, "mako", &CallerExpectations::default()).unwrap();
    assert!(summary.passed());
}

#[test]
fn missing_interface_is_reported_by_name() {
    let mut modem = conformant_modem("/ril_0", "mako", true, true);
    let snapshot = modem.objects.get_mut(&ObjectKind::Modem).unwrap();
    let ifaces: Vec<String> = snapshot
        .get("Interfaces")
        .and_then(PropValue::as_str_list)
        .unwrap()
        .iter()
        .filter(|i| *i != "org.ofono.NetworkTime")
        .cloned()
        .collect();
    let mut rebuilt = PropertySnapshot::new();
    for key in snapshot.keys().map(str::to_owned).collect::<Vec<_>>() {
        if key == "Interfaces" {
            rebuilt.push("Interfaces", ifaces.clone());
        } else {
            rebuilt.push(key.clone(), snapshot.get(&key).unwrap().clone());
        }
    }
    *snapshot = rebuilt;
    let bus = single_modem_bus(modem);
    let summary = run_all(&bus, "mako", &CallerExpectations::default()).unwrap();
    assert!(!summary.passed());

    let failure = summary
        .reports()
        .flat_map(|r| r.failures())
        .find(|c| c.property == "Interfaces")
        .and_then(|c| c.failure.clone())
        .expect("interfaces failure");
    match failure {
        Discrepancy::SetContainment { missing, .. } => {
            assert_eq!(missing, vec!["org.ofono.NetworkTime"]);
        }
        other => panic!("wrong failure kind: {other:?}"),
    }
}

#[test]
fn transport_failure_skips_only_that_modem() {
    let mut rec = Recording::new();
    rec.push(RecordedModem {
        path: "/ril_0".to_owned(),
        objects: BTreeMap::new(),
    });
    rec.push(conformant_modem("/ril_1", "goldfish", true, true));
    let bus = ReplayBus::new(rec);

    let summary = run_all(&bus, "goldfish", &CallerExpectations::default()).unwrap();
    assert!(!summary.passed());
    assert_eq!(summary.outcomes.len(), 2);
    assert!(matches!(
        summary.outcomes[0],
        ModemOutcome::Transport { .. }
    ));
    assert!(summary.outcomes[1].passed());
}

#[test]
fn run_summary_is_idempotent() {
    let bus = single_modem_bus(conformant_modem("/ril_0", "goldfish", true, true));
    let caller = CallerExpectations::default();
    let first = run_all(&bus, "goldfish", &caller).unwrap();
    let second = run_all(&bus, "goldfish", &caller).unwrap();
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[test]
fn rogue_emergency_number_fails_the_run() {
    let mut modem = conformant_modem("/ril_0", "mako", true, true);
    let voice = modem.objects.get_mut(&ObjectKind::VoiceCallManager).unwrap();
    let mut rebuilt = PropertySnapshot::new();
    let mut numbers = voice
        .get("EmergencyNumbers")
        .and_then(PropValue::as_str_list)
        .unwrap()
        .to_vec();
    numbers.push("01189998819991197253".to_owned());
    rebuilt.push("EmergencyNumbers", numbers);
    *voice = rebuilt;

    let bus = single_modem_bus(modem);
    let summary = run_all(&bus, "mako", &CallerExpectations::default()).unwrap();
    assert!(!summary.passed());
    let failure = summary
        .reports()
        .flat_map(|r| r.failures())
        .find(|c| c.property == "EmergencyNumbers")
        .expect("emergency failure");
    assert_eq!(failure.actual, "01189998819991197253");
}

#[test]
fn caller_supplied_mcc_is_enforced_for_hardware_variants() {
    let mut modem = conformant_modem("/ril_0", "mako", true, true);
    let sim = modem.objects.get_mut(&ObjectKind::SimManager).unwrap();
    sim.push("MobileCountryCode", "234");

    let bus = single_modem_bus(modem);

    let matching = CallerExpectations {
        mcc: Some("234".to_owned()),
        ..Default::default()
    };
    assert!(run_all(&bus, "mako", &matching).unwrap().passed());

    let mismatched = CallerExpectations {
        mcc: Some("310".to_owned()),
        ..Default::default()
    };
    assert!(!run_all(&bus, "mako", &mismatched).unwrap().passed());
}

#[test]
fn pin_locked_sim_is_a_value_mismatch() {
    let mut modem = conformant_modem("/ril_0", "mako", true, true);
    let sim = modem.objects.get_mut(&ObjectKind::SimManager).unwrap();
    let mut rebuilt = PropertySnapshot::new();
    for key in sim.keys().map(str::to_owned).collect::<Vec<_>>() {
        match key.as_str() {
            "PinRequired" => rebuilt.push("PinRequired", "pin"),
            "LockedPins" => rebuilt.push("LockedPins", vec!["pin".to_owned()]),
            _ => rebuilt.push(key.clone(), sim.get(&key).unwrap().clone()),
        }
    }
    *sim = rebuilt;

    let bus = single_modem_bus(modem);
    let summary = run_all(&bus, "mako", &CallerExpectations::default()).unwrap();
    let failures: Vec<_> = summary
        .reports()
        .flat_map(|r| r.failures())
        .map(|c| c.property.clone())
        .collect();
    assert!(failures.contains(&"PinRequired".to_owned()), "{failures:?}");
    assert!(failures.contains(&"LockedPins".to_owned()), "{failures:?}");
}
