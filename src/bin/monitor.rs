use clap::{App, Arg};
use colored::*;
use ecusim::{CanFrame, SignalKind, FRAME_TOPIC};
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let matches = App::new("ecusim-monitor")
        .version("0.1.0")
        .author("Vehicle Systems Engineering Team")
        .about("📡 Live monitor for CAN telemetry frames published by ecusim nodes")
        .arg(
            Arg::with_name("host")
                .short("h")
                .long("host")
                .value_name("HOST")
                .help("MQTT broker address")
                .takes_value(true)
                .default_value("localhost"),
        )
        .arg(
            Arg::with_name("port")
                .short("p")
                .long("port")
                .value_name("PORT")
                .help("MQTT broker port")
                .takes_value(true)
                .default_value("1883")
                .validator(|v| {
                    v.parse::<u16>()
                        .map(|_| ())
                        .map_err(|_| "Port must be a number between 0 and 65535".into())
                }),
        )
        .arg(
            Arg::with_name("format")
                .short("f")
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .takes_value(true)
                .possible_values(&["table", "json"])
                .default_value("table"),
        )
        .get_matches();

    let host = matches.value_of("host").unwrap();
    let port: u16 = matches.value_of("port").unwrap().parse()?;
    let format = matches.value_of("format").unwrap().to_string();

    let mut options = MqttOptions::new("ecusim-monitor", host, port);
    options.set_keep_alive(Duration::from_secs(60));
    let (client, mut event_loop) = AsyncClient::new(options, 10);
    client.subscribe(FRAME_TOPIC, QoS::AtMostOnce).await?;

    println!(
        "{} {} (Press Ctrl+C to stop)",
        "📡 Monitoring".bright_blue().bold(),
        FRAME_TOPIC.bright_cyan()
    );

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                match serde_json::from_slice::<CanFrame>(&publish.payload) {
                    Ok(frame) => print_frame(&frame, &format),
                    Err(e) => eprintln!("{} undecodable payload: {}", "⚠️".yellow(), e),
                }
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("{} broker connection error: {}", "❌".red(), e);
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

fn print_frame(frame: &CanFrame, format: &str) {
    if format == "json" {
        match serde_json::to_string(frame) {
            Ok(line) => println!("{}", line),
            Err(e) => eprintln!("{} re-encode failed: {}", "⚠️".yellow(), e),
        }
        return;
    }

    let decoded = SignalKind::from_can_id(frame.can_id)
        .and_then(|kind| kind.decode(&frame.data).map(|value| (kind, value)));

    match decoded {
        Some((kind, value)) => println!(
            "[{:>14.3}] node {} {:>4} {:>15} = {:>5} {}",
            frame.timestamp,
            frame.node_id.to_string().bright_cyan(),
            format!("{:#x}", frame.can_id).dimmed(),
            kind.name().bright_white(),
            value.to_string().bright_green(),
            kind.unit().dimmed()
        ),
        None => println!(
            "[{:>14.3}] node {} {:>4} {:?}",
            frame.timestamp,
            frame.node_id.to_string().bright_cyan(),
            format!("{:#x}", frame.can_id).dimmed(),
            &frame.data[..]
        ),
    }
}
