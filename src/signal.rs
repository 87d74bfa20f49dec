// src/signal.rs

use crate::pin_ref::PIN_SEPARATOR;

/// Keyword -> signal label, checked in order against both pin references.
/// Order matters: the first keyword found wins.
pub const SIGNAL_PATTERNS: &[(&str, &str)] = &[
    ("SDA", "I2C Data"),
    ("SCL", "I2C Clock"),
    ("MOSI", "SPI Data"),
    ("MISO", "SPI Data"),
    ("SCK", "SPI Clock"),
    ("SCLK", "SPI Clock"),
    ("CS", "SPI Select"),
    ("SS", "SPI Select"),
    ("NSS", "SPI Select"),
    ("GND", "Ground"),
    ("VCC", "Power"),
    ("VDD", "Power"),
    ("3V3", "Power"),
    ("3.3V", "Power"),
    ("5V", "Power"),
    ("12V", "Power"),
    ("VBAT", "Power"),
    ("VIN", "Power"),
    ("VOUT", "Power"),
    ("PWM", "PWM"),
    ("ADC", "Analog"),
    ("DAC", "Analog"),
    ("INT", "Interrupt"),
    ("IRQ", "Interrupt"),
    ("RST", "Reset"),
    ("RESET", "Reset"),
    ("EN", "Enable"),
    ("ENABLE", "Enable"),
    // RS-485 / RS-422
    ("RS485", "RS-485"),
    ("RS422", "RS-422"),
    ("485_DE", "RS-485 Driver Enable"),
    ("485_RE", "RS-485 Receiver Enable"),
    ("485_DI", "RS-485 Driver Input"),
    ("485_RO", "RS-485 Receiver Output"),
    ("DATA+", "RS-485 Data+"),
    ("DATA-", "RS-485 Data-"),
    // CAN bus
    ("CANH", "CAN High"),
    ("CANL", "CAN Low"),
    ("CAN_H", "CAN High"),
    ("CAN_L", "CAN Low"),
    ("CAN_TX", "CAN TX"),
    ("CAN_RX", "CAN RX"),
];

/// Transceiver pin names that only mean RS-485 as a whole token.
const RS485_PINS: [&str; 6] = ["DI", "RO", "DE", "RE", "/RE", "~RE"];

/// Best-effort signal labelling for documentation tables.
#[derive(Debug, Clone, Default)]
pub struct SignalClassifier {
    /// Extra keyword -> label pairs, consulted after the built-in table.
    custom: Vec<(String, String)>,
}

impl SignalClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pattern(&mut self, keyword: &str, label: impl Into<String>) {
        self.custom.push((keyword.to_uppercase(), label.into()));
    }

    /// Returns a short label such as `"UART"` or `"I2C Data"`, or `""`
    /// when nothing matches.
    pub fn classify<'a>(&'a self, src: &str, dst: &str) -> &'a str {
        let src_upper = src.to_uppercase();
        let dst_upper = dst.to_uppercase();
        let combined = format!("{src_upper}{dst_upper}");

        // CAN first so CAN_TX/CAN_RX never read as UART.
        if combined.contains("CAN") {
            return can_label(&combined);
        }

        if RS485_PINS.contains(&trailing_token(&src_upper))
            || RS485_PINS.contains(&trailing_token(&dst_upper))
        {
            return "RS-485";
        }

        if (src_upper.contains("TX") && dst_upper.contains("RX"))
            || (src_upper.contains("RX") && dst_upper.contains("TX"))
        {
            return "UART";
        }

        if let Some((_, label)) = SIGNAL_PATTERNS
            .iter()
            .find(|(keyword, _)| combined.contains(keyword))
        {
            return *label;
        }

        self.custom
            .iter()
            .find(|(keyword, _)| combined.contains(keyword.as_str()))
            .map(|(_, label)| label.as_str())
            .unwrap_or("")
    }
}

fn can_label(combined: &str) -> &'static str {
    let has = |a: &str, b: &str| combined.contains(a) || combined.contains(b);
    if has("CANH", "CAN_H") {
        "CAN High"
    } else if has("CANL", "CAN_L") {
        "CAN Low"
    } else if has("CAN_TX", "CANTX") {
        "CAN TX"
    } else if has("CAN_RX", "CANRX") {
        "CAN RX"
    } else {
        "CAN"
    }
}

fn trailing_token(pin_ref: &str) -> &str {
    pin_ref.rsplit(PIN_SEPARATOR).next().unwrap_or(pin_ref)
}

/// Classifies with the built-in table only.
pub fn infer_signal_type(src: &str, dst: &str) -> &'static str {
    static DEFAULT: SignalClassifier = SignalClassifier { custom: Vec::new() };
    DEFAULT.classify(src, dst)
}
