use spinwheel::{MissingForced, SpinWheel, WheelCommand, WheelConfig};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let config = WheelConfig::builder()
        .title("Forced demo".to_string())
        .missing_forced(MissingForced::Append)
        .build();

    let mut wheel = SpinWheel::new(config);

    let (sender, receiver) = mpsc::channel();

    // Alternate forced and fair spins; the last one adds a new entry on the fly
    thread::spawn(move || {
        let script = [
            WheelCommand::SpinForced("SKULL".to_string()),
            WheelCommand::Spin,
            WheelCommand::Shuffle,
            WheelCommand::SpinForced("kajinka".to_string()),
            WheelCommand::Sort,
            WheelCommand::SpinForced("NOVÁČEK".to_string()),
        ];
        for command in script.iter().cycle() {
            if sender.send(command.clone()).is_err() {
                break;
            }
            thread::sleep(Duration::from_millis(7000));
        }
    });

    println!("Spinning on a script: forced, fair, shuffle, forced, sort, append-and-win.");
    println!("Space spins by hand. Close the window to exit.");

    wheel.show_with_commands(receiver)
}
