use clap::{App, Arg};
use colored::*;
use ecusim::{ConnectionSupervisor, NodeConfig, NodeSimulator};
use std::sync::atomic::Ordering;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let matches = App::new("ecusim")
        .version("0.1.0")
        .author("Vehicle Systems Engineering Team")
        .about("🚗 ECU node simulator - publishes CAN bus telemetry to an MQTT broker")
        .arg(
            Arg::with_name("node-id")
                .help("Numeric identifier of the simulated node")
                .index(1)
                .default_value("1")
                .validator(|v| {
                    v.parse::<u16>()
                        .map(|_| ())
                        .map_err(|_| "Node id must be a number between 0 and 65535".into())
                }),
        )
        .arg(
            Arg::with_name("broker")
                .help("MQTT broker address")
                .index(2)
                .default_value("localhost"),
        )
        .arg(
            Arg::with_name("port")
                .help("MQTT broker port")
                .index(3)
                .default_value("1883")
                .validator(|v| {
                    v.parse::<u16>()
                        .map(|_| ())
                        .map_err(|_| "Port must be a number between 0 and 65535".into())
                }),
        )
        .arg(
            Arg::with_name("frequency")
                .help("Publish frequency in Hz")
                .index(4)
                .default_value("10")
                .validator(|v| match v.parse::<f64>() {
                    Ok(f) if f > 0.0 => Ok(()),
                    _ => Err("Frequency must be a positive number".into()),
                }),
        )
        .arg(
            Arg::with_name("qos")
                .long("qos")
                .value_name("QOS")
                .help("MQTT publish quality of service")
                .takes_value(true)
                .possible_values(&["0", "1"])
                .default_value("0"),
        )
        .arg(
            Arg::with_name("with-date")
                .long("with-date")
                .help("Include the DD/MM/YYYY date field in each payload"),
        )
        .get_matches();

    let config = NodeConfig {
        node_id: matches.value_of("node-id").unwrap().parse()?,
        broker_host: matches.value_of("broker").unwrap().to_string(),
        broker_port: matches.value_of("port").unwrap().parse()?,
        frequency_hz: matches.value_of("frequency").unwrap().parse()?,
        qos: matches.value_of("qos").unwrap().parse()?,
        with_date: matches.is_present("with-date"),
    };

    println!("{}", "🚗 ECU Node Simulator".bright_blue().bold());
    println!(
        "{} node {} → {}:{} @ {} Hz",
        "Starting".dimmed(),
        config.node_id.to_string().bright_cyan(),
        config.broker_host,
        config.broker_port,
        config.frequency_hz
    );

    let link = match ConnectionSupervisor::connect(&config, CONNECT_TIMEOUT).await {
        Ok(link) => link,
        Err(e) => {
            eprintln!("{} {}", "❌".red(), e.to_string().bright_red());
            std::process::exit(1);
        }
    };
    println!("{} Connected to broker", "✅".green());

    let mut simulator = NodeSimulator::new(config, link);
    let stop = simulator.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\n{} Shutdown requested", "🛑".red());
            stop.store(false, Ordering::SeqCst);
        }
    });

    simulator.run().await;

    println!(
        "{} Node stopped ({} frames published)",
        "🚗".bright_blue(),
        simulator.stats().frames_published.to_string().bright_cyan()
    );
    Ok(())
}
