use glam::DVec2;
use kicad_schgen_rs::{Design, Error, common_parts::expand_lib_id};
use std::fs;
use tempfile::tempdir;

const SENSOR_BOARD: &str = r#"{
    "title": "Sensor board",
    "components": {
        "U1": { "lib_id": "teensy41", "value": "Teensy4.1", "pins": { "SDA": "18", "SCL": "19" } },
        "R1": { "lib_id": "resistor", "value": "4.7k" },
        "R2": { "value": "4.7k", "position": [101.6, 50.8] },
        "J1": { "lib_id": "Connector_Generic:Conn_01x04", "value": "I2C", "footprint": "Connector_JST:JST_SH_SM04B" }
    },
    "connections": [
        { "from": "U1.SDA", "to": "R1.1" },
        { "from": "U1.SCL", "to": "R2.1" }
    ],
    "power_nets": [
        { "pins": ["R1.2", "R2.2"], "net": "3V3" }
    ]
}"#;

#[test]
fn test_design_json_expands_aliases() {
    let design = Design::from_json_str(SENSOR_BOARD).unwrap();

    assert_eq!(design.title.as_deref(), Some("Sensor board"));
    let refs: Vec<&str> = design.components.keys().map(String::as_str).collect();
    assert_eq!(refs, ["U1", "R1", "R2", "J1"]);

    assert_eq!(design.components["U1"].lib_id, "MCU_Module:Teensy4.1");
    assert_eq!(design.components["U1"].pins["SCL"], "19");
    assert_eq!(design.components["R1"].lib_id, "Device:R");
    // Missing lib_id defaults to a resistor.
    assert_eq!(design.components["R2"].lib_id, "Device:R");
    assert_eq!(design.components["R2"].position, Some(DVec2::new(101.6, 50.8)));
    assert_eq!(
        design.components["J1"].footprint.as_deref(),
        Some("Connector_JST:JST_SH_SM04B")
    );

    assert_eq!(design.connections.len(), 2);
    assert_eq!(design.power_nets[0].net, "3V3");
}

#[test]
fn test_load_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("board.json");
    fs::write(&path, SENSOR_BOARD).unwrap();

    let design = Design::load(&path).unwrap();
    assert_eq!(design.components.len(), 4);

    assert!(matches!(
        Design::load(&dir.path().join("missing.json")),
        Err(Error::IoError(_))
    ));
}

#[test]
fn test_malformed_design_is_rejected() {
    let err = Design::from_json_str(r#"{ "components": [1, 2] }"#).unwrap_err();
    assert!(matches!(err, Error::JsonError(_)));
}

#[test]
fn test_alias_expansion() {
    assert_eq!(expand_lib_id("LED"), "Device:LED");
    assert_eq!(expand_lib_id("conn_1x4"), "Connector_Generic:Conn_01x04");
    assert_eq!(expand_lib_id("Device:R"), "Device:R");
    assert_eq!(expand_lib_id("mystery_part"), "mystery_part");
}
