use kicad_schgen_rs::{
    BuildOptions, Mcu, McuPair, draw_mcu_connection,
    mcu::{DEFAULT_MCU_FILENAME, PULLUP_SUPPLY_NET},
};
use std::fs;
use tempfile::tempdir;

fn teensy_rp2040() -> McuPair {
    let teensy = Mcu::new(
        "U1",
        "MCU_Module:Teensy4.1",
        [("TX1", "1"), ("RX1", "0"), ("SDA", "18"), ("SCL", "19"), ("GND", "G")],
    );
    let rp2040 = Mcu::new(
        "U2",
        "MCU_Module:RP2040-Zero",
        [("RX", "GP1"), ("TX", "GP0"), ("SDA", "GP4"), ("SCL", "GP5"), ("GND", "G")],
    );
    McuPair::new(teensy, rp2040)
        .connect("TX1", "RX")
        .connect("RX1", "TX")
        .connect("SDA", "SDA")
        .connect("SCL", "SCL")
        .connect("GND", "GND")
        .pull_up(["SDA", "SCL"])
}

#[test]
fn test_pullups_added_for_bus_pins() {
    let design = teensy_rp2040().to_design();

    let refs: Vec<&str> = design.components.keys().map(String::as_str).collect();
    assert_eq!(refs, ["U1", "U2", "R1", "R2"]);
    assert_eq!(design.components["U1"].value, "Teensy4.1");
    assert_eq!(design.components["R1"].lib_id, "Device:R");
    assert_eq!(design.components["R1"].value, "4.7k");

    // Five direct links plus one per pull-up.
    assert_eq!(design.connections.len(), 7);
    assert!(design.connections.iter().any(|c| c.from == "U1.SDA" && c.to == "R1.1"));
    assert!(design.connections.iter().any(|c| c.from == "U1.SCL" && c.to == "R2.1"));

    assert_eq!(design.power_nets.len(), 1);
    assert_eq!(design.power_nets[0].net, PULLUP_SUPPLY_NET);
    assert_eq!(design.power_nets[0].pins, ["R1.2", "R2.2"]);
}

#[test]
fn test_repeated_bus_signal_gets_one_pullup() {
    let pair = teensy_rp2040().connect("SDA", "SDA").pullup_value("2.2k");
    let design = pair.to_design();

    let resistors: Vec<_> = design
        .components
        .iter()
        .filter(|(_, spec)| spec.lib_id == "Device:R")
        .collect();
    assert_eq!(resistors.len(), 2);
    assert!(resistors.iter().all(|(_, spec)| spec.value == "2.2k"));
    assert_eq!(design.power_nets[0].pins.len(), 2);
}

#[test]
fn test_no_bus_pins_no_supply_net() {
    let pair = McuPair::new(
        Mcu::new("U1", "MCU_Module:Teensy4.0", [("TX1", "1")]),
        Mcu::new("U2", "MCU_Module:Arduino_Nano_v3.x", [("RX", "2")]),
    )
    .connect("TX1", "RX");
    let design = pair.to_design();

    assert_eq!(design.components.len(), 2);
    assert_eq!(design.connections.len(), 1);
    assert!(design.power_nets.is_empty());
}

#[tokio::test]
async fn test_draw_mcu_connection() {
    let dir = tempdir().unwrap();
    let options = BuildOptions {
        render: false,
        output_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let pair = teensy_rp2040().title("Teensy to RP2040");
    let output = draw_mcu_connection(&pair, DEFAULT_MCU_FILENAME, &options)
        .await
        .unwrap();

    assert!(output.warnings.is_empty(), "unexpected warnings: {:?}", output.warnings);
    let sch = fs::read_to_string(&output.schematic).unwrap();
    assert!(sch.contains("(symbol \"MCU_Module:Teensy4.1\""));
    assert!(sch.contains("(label \"VCC\""));
    assert!(sch.contains("(title_block (title \"Teensy to RP2040\"))"));

    let md = fs::read_to_string(output.markdown.unwrap()).unwrap();
    assert!(md.starts_with("# Teensy to RP2040\n"));
    assert!(md.contains("| U1.TX1 | U2.RX | UART |"));
    assert!(md.contains("| U1.SDA | U2.SDA | I2C Data |"));
    assert!(md.contains("| VCC | R1.2, R2.2 |"));
    assert!(md.contains("Check voltage levels between MCUs"));
}
