use spinart_core::trajectory::Trajectory;
use std::{env, fs, path::Path};

fn describe(trajectory: &Trajectory) -> String {
    match trajectory {
        Trajectory::Absolute(t) => format!(
            "absolute, {} arms, {} frames",
            t.arm_count(),
            t.frames.len()
        ),
        Trajectory::Waypoints(t) => format!("waypoints, {} points", t.waypoints.len()),
    }
}

fn main() {
    let mut json = false;
    let paths: Vec<String> = env::args()
        .skip(1)
        .filter(|arg| {
            let flag = arg == "--json";
            json |= flag;
            !flag
        })
        .collect();
    if paths.is_empty() {
        eprintln!("usage: check [--json] <file> [<file>...]");
        std::process::exit(1);
    }

    let mut failed = 0usize;
    for path in paths {
        let input = match fs::read_to_string(Path::new(&path)) {
            Ok(s) => s,
            Err(err) => {
                eprintln!("{path}: read error: {err}");
                failed += 1;
                continue;
            }
        };

        let trajectory = spinart_trajectory::parse(&input);
        if trajectory.is_empty() {
            println!("ERR {path}: no trajectory data");
            failed += 1;
            continue;
        }

        println!("OK {path}: {}", describe(&trajectory));
        if json {
            match serde_json::to_string_pretty(&trajectory) {
                Ok(rendered) => println!("{rendered}"),
                Err(err) => eprintln!("{path}: failed to render JSON: {err}"),
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
}
