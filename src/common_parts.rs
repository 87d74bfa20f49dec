// src/common_parts.rs

/// Short aliases for frequently used KiCad library identifiers.
pub const COMMON_COMPONENTS: &[(&str, &str)] = &[
    // Passives
    ("resistor", "Device:R"),
    ("capacitor", "Device:C"),
    ("capacitor_polarized", "Device:CP"),
    ("inductor", "Device:L"),
    ("potentiometer", "Device:R_Potentiometer"),
    // Diodes
    ("diode", "Device:D"),
    ("led", "Device:LED"),
    ("zener", "Device:D_Zener"),
    ("schottky", "Device:D_Schottky"),
    // Transistors
    ("npn", "Device:Q_NPN_BCE"),
    ("pnp", "Device:Q_PNP_BCE"),
    ("nmos", "Device:Q_NMOS_GDS"),
    ("pmos", "Device:Q_PMOS_GDS"),
    // MCU modules
    ("teensy41", "MCU_Module:Teensy4.1"),
    ("teensy40", "MCU_Module:Teensy4.0"),
    ("rp2040_zero", "MCU_Module:RP2040-Zero"),
    ("arduino_nano", "MCU_Module:Arduino_Nano_v3.x"),
    ("esp32_devkit", "MCU_Module:ESP32-DevKitC"),
    // Connectors
    ("conn_1x2", "Connector_Generic:Conn_01x02"),
    ("conn_1x4", "Connector_Generic:Conn_01x04"),
    ("conn_1x6", "Connector_Generic:Conn_01x06"),
    ("conn_2x3", "Connector_Generic:Conn_02x03"),
    // Power
    ("vcc", "power:VCC"),
    ("gnd", "power:GND"),
    ("vdd", "power:VDD"),
    ("vss", "power:VSS"),
];

/// Looks up the library identifier for an alias such as `"resistor"`.
pub fn lib_id_for(alias: &str) -> Option<&'static str> {
    COMMON_COMPONENTS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(alias))
        .map(|(_, lib_id)| *lib_id)
}

/// Expands an alias to its library identifier; anything already in
/// `library:part` form (or unknown) is returned unchanged.
pub fn expand_lib_id(lib_id: &str) -> String {
    if lib_id.contains(':') {
        return lib_id.to_string();
    }
    lib_id_for(lib_id).unwrap_or(lib_id).to_string()
}
