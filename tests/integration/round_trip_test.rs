//! Integration tests for TCX -> KRD -> TCX conversion

use kaiord::krd::types::{
    Duration, DurationKind, ExtensionBag, Intensity, KrdDocument, Metadata, Sport, Target,
    TargetValue, VendorExtensions, Workout, WorkoutEntry, WorkoutStep,
};
use kaiord::tcx::workout::{sport_from_tcx, sport_to_tcx};
use kaiord::tcx::{read_tcx, StructuralValidator, TcxReader, TcxWriter};
use kaiord::xml::{XmlElement, XmlNode};
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use std::fs;

fn load_fixture() -> String {
    fs::read_to_string("tests/fixtures/workouts/sweet_spot_intervals.tcx")
        .expect("Failed to read fixture")
}

async fn write(krd: &KrdDocument) -> String {
    TcxWriter::new(StructuralValidator::new())
        .write(krd)
        .await
        .expect("Failed to write TCX")
}

/// Qualified names of elements whose prefix has no binding in scope.
fn undeclared_prefixed_elements(xml: &str) -> Vec<String> {
    let mut reader = NsReader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut undeclared = Vec::new();

    loop {
        match reader.read_resolved_event_into(&mut buf) {
            Ok((ResolveResult::Unknown(_), Event::Start(e) | Event::Empty(e))) => {
                undeclared.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
            Err(e) => panic!("Error reading written TCX: {:?}", e),
        }
        buf.clear();
    }

    undeclared
}

fn single_step(step: WorkoutStep) -> KrdDocument {
    KrdDocument::new(
        Metadata {
            sport: Some("running".to_string()),
            ..Default::default()
        },
        Some(Workout::new(Sport::Running, vec![WorkoutEntry::Step(step)])),
    )
}

#[tokio::test]
async fn test_fixture_round_trip() {
    let original = read_tcx(&load_fixture()).unwrap();

    let xml = write(&original).await;
    let reread = TcxReader::new().read(&xml).unwrap();

    assert_eq!(reread, original);

    // writing the re-read document reproduces the same text
    assert_eq!(write(&reread).await, xml);
}

#[tokio::test]
async fn test_written_prefixes_are_declared() {
    let xml = write(&read_tcx(&load_fixture()).unwrap()).await;

    assert!(xml.contains("<ns3:TPX"));
    assert_eq!(undeclared_prefixed_elements(&xml), Vec::<String>::new());
}

#[tokio::test]
async fn test_vendor_prefix_binding_survives() {
    let tcx = r#"<?xml version="1.0" encoding="UTF-8"?>
<TrainingCenterDatabase xmlns="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2" xmlns:vx="urn:example:vendor" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <Workouts>
    <Workout Sport="Running">
      <Name>Strides</Name>
      <Step xsi:type="Step_t">
        <StepId>1</StepId>
        <Duration xsi:type="Time_t"><Seconds>20</Seconds></Duration>
        <Intensity>Active</Intensity>
        <Target xsi:type="None_t"/>
        <Extensions><vx:Cue vx:tone="high">go</vx:Cue></Extensions>
      </Step>
    </Workout>
  </Workouts>
  <Extensions><vx:Session>am</vx:Session></Extensions>
</TrainingCenterDatabase>"#;

    let krd = read_tcx(tcx).unwrap();
    let xml = write(&krd).await;

    assert_eq!(undeclared_prefixed_elements(&xml), Vec::<String>::new());

    let reread = read_tcx(&xml).unwrap();
    assert_eq!(reread, krd);
    let cue = reread.workout().unwrap().steps[0]
        .as_step()
        .and_then(|s| s.tcx_extensions())
        .and_then(|bag| bag.elements_named("Cue").next())
        .expect("Missing vendor cue");
    assert_eq!(cue.attribute("xmlns:vx"), Some("urn:example:vendor"));
    assert_eq!(cue.attribute("vx:tone"), Some("high"));
}

#[tokio::test]
async fn test_native_kinds_round_trip() {
    let mut warm_up = WorkoutStep::new(0, Duration::Time { seconds: 900.0 }, Target::Open);
    warm_up.intensity = Some(Intensity::Warmup);
    warm_up.name = Some("Easy".to_string());

    let mut tempo = WorkoutStep::new(
        1,
        Duration::Distance { meters: 5000.0 },
        Target::HeartRate {
            value: TargetValue::Zone { value: 4 },
        },
    );
    tempo.intensity = Some(Intensity::Active);

    let mut workout = Workout::new(
        Sport::Running,
        vec![WorkoutEntry::Step(warm_up), WorkoutEntry::Step(tempo)],
    );
    workout.name = Some("Tempo".to_string());
    let krd = KrdDocument::new(
        Metadata {
            created: Some("2025-02-02T06:00:00Z".to_string()),
            sport: Some("running".to_string()),
            manufacturer: Some("garmin".to_string()),
            product: Some("fenix_7".to_string()),
            serial_number: Some("3456789".to_string()),
        },
        Some(workout),
    );

    let decoded = read_tcx(&write(&krd).await).unwrap();

    assert_eq!(decoded, krd);
}

#[tokio::test]
async fn test_extended_durations_round_trip() {
    let durations = vec![
        Duration::HeartRateLessThan { bpm: Some(140) },
        Duration::PowerLessThan { watts: Some(150) },
        Duration::PowerGreaterThan { watts: Some(320) },
        Duration::Calories { calories: Some(500) },
        Duration::RepeatUntilTime {
            seconds: Some(1800.0),
            repeat_from: 1,
        },
        Duration::RepeatUntilDistance {
            meters: Some(10_000.0),
            repeat_from: 0,
        },
        Duration::RepeatUntilCalories {
            calories: Some(700),
            repeat_from: 2,
        },
        Duration::RepeatUntilHeartRateGreaterThan {
            bpm: Some(170),
            repeat_from: 1,
        },
        Duration::RepeatUntilHeartRateLessThan {
            bpm: Some(110),
            repeat_from: 1,
        },
        Duration::RepeatUntilPowerLessThan {
            watts: Some(100),
            repeat_from: 0,
        },
        Duration::RepeatUntilPowerGreaterThan {
            watts: Some(400),
            repeat_from: 3,
        },
    ];

    for duration in durations {
        let krd = single_step(WorkoutStep::new(0, duration.clone(), Target::Open));
        let decoded = read_tcx(&write(&krd).await).unwrap();
        let step = decoded.workout().unwrap().steps[0].as_step().unwrap();

        assert_eq!(step.duration, duration, "kind {}", duration.kind());
    }
}

#[tokio::test]
async fn test_missing_payload_decodes_as_open() {
    let krd = single_step(WorkoutStep::new(
        0,
        Duration::HeartRateLessThan { bpm: None },
        Target::Open,
    ));

    let decoded = read_tcx(&write(&krd).await).unwrap();
    let step = decoded.workout().unwrap().steps[0].as_step().unwrap();

    assert_eq!(step.duration_type(), DurationKind::Open);
}

#[tokio::test]
async fn test_lossy_targets_are_dropped() {
    let targets = vec![
        Target::Pace {
            value: TargetValue::Mps { value: 3.5 },
        },
        Target::Power {
            value: TargetValue::PercentFtp { value: 95.0 },
        },
    ];

    for target in targets {
        let krd = single_step(WorkoutStep::new(
            0,
            Duration::Time { seconds: 120.0 },
            target.clone(),
        ));

        let xml = write(&krd).await;
        let decoded = read_tcx(&xml).unwrap();
        let step = decoded.workout().unwrap().steps[0].as_step().unwrap();

        assert!(!xml.contains("TPX"), "{:?}", target);
        assert_eq!(step.target, Target::Open, "{:?}", target);
    }
}

#[tokio::test]
async fn test_extension_passthrough_is_idempotent() {
    let vendor = ExtensionBag::new(vec![XmlNode::Element(
        XmlElement::new("Vendor")
            .with_attribute("version", "3")
            .with_child(XmlElement::text_element("Flag", "on"))
            .with_child(XmlElement::new("Empty")),
    )]);

    let mut step = WorkoutStep::new(0, Duration::Time { seconds: 60.0 }, Target::Open);
    step.extensions = Some(VendorExtensions::tcx(vendor.clone()));
    let mut workout = Workout::new(Sport::Cycling, vec![WorkoutEntry::Step(step)]);
    workout.extensions = Some(VendorExtensions::tcx(vendor.clone()));
    let mut krd = KrdDocument::new(Metadata::default(), Some(workout));
    krd.extensions.tcx = Some(vendor.clone());

    let xml = write(&krd).await;
    let decoded = read_tcx(&xml).unwrap();
    let workout = decoded.workout().unwrap();

    assert_eq!(decoded.extensions.tcx.as_ref(), Some(&vendor));
    assert_eq!(workout.tcx_extensions(), Some(&vendor));
    assert_eq!(workout.steps[0].as_step().unwrap().tcx_extensions(), Some(&vendor));

    assert_eq!(write(&decoded).await, xml);
}

#[tokio::test]
async fn test_sport_mapping_totality() {
    for sport in [Sport::Running, Sport::Cycling, Sport::Swimming, Sport::Generic] {
        let krd = KrdDocument::new(
            Metadata::default(),
            Some(Workout::new(
                sport,
                vec![WorkoutEntry::Step(WorkoutStep::new(0, Duration::Open, Target::Open))],
            )),
        );

        let decoded = read_tcx(&write(&krd).await).unwrap();
        assert_eq!(decoded.workout().unwrap().sport, sport);
    }

    for unknown in ["Rowing", "", "biking"] {
        assert_eq!(sport_from_tcx(unknown), Sport::Generic);
    }
    assert_eq!(sport_to_tcx(Sport::Generic), "Other");
}
