use kicad_schgen_rs::{BuildOptions, Mcu, McuPair, draw_mcu_connection, mcu::DEFAULT_MCU_FILENAME};
use std::time::Instant;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let teensy = Mcu::new(
        "U1",
        "MCU_Module:Teensy4.1",
        [
            ("TX1", "1"),
            ("RX1", "0"),
            ("SDA", "18"),
            ("SCL", "19"),
            ("CAN_TX", "22"),
            ("CAN_RX", "23"),
            ("GND", "GND"),
            ("3V3", "3V3"),
        ],
    );
    let rp2040 = Mcu::new(
        "U2",
        "MCU_Module:RP2040-Zero",
        [
            ("RX", "GP1"),
            ("TX", "GP0"),
            ("SDA", "GP4"),
            ("SCL", "GP5"),
            ("GND", "GND"),
            ("3V3", "3V3"),
        ],
    );

    let pair = McuPair::new(teensy, rp2040)
        .title("Teensy 4.1 to RP2040-Zero")
        .connect("TX1", "RX")
        .connect("RX1", "TX")
        .connect("SDA", "SDA")
        .connect("SCL", "SCL")
        .connect("GND", "GND")
        .connect("3V3", "3V3")
        .pull_up(["SDA", "SCL"]);

    let start_time = Instant::now();
    match draw_mcu_connection(&pair, DEFAULT_MCU_FILENAME, &BuildOptions::default()).await {
        Ok(output) => {
            println!("Schematic: {}", output.schematic.display());
            if let Some(svg) = &output.svg {
                println!("SVG: {}", svg.display());
            }
            if let Some(md) = &output.markdown {
                println!("Connection table: {}", md.display());
            }
            println!("{} warning(s)", output.warnings.len());
        }
        Err(e) => eprintln!("Error building schematic: {}", e),
    }
    println!("Done in {:?}", start_time.elapsed());
}
