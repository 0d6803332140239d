//! Synthetic archive generator for stress testing ichatpack.
//!
//! Writes converted (XML) archives plus a matching `names.json` into a
//! directory, ready for `ichatpack parse`.
//!
//! Usage: cargo run --features gen-test --bin gen_archive -- [archives] [messages] [output_dir]
//! Example: cargo run --features gen-test --bin gen_archive -- 200 500 synthetic

use std::env;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use ichatpack::parsing::{datetime_from_cocoa, escape_xml_chars};
use rand::Rng;
use rand::seq::SliceRandom;

const SELF_EMAIL: &str = "me@example.com";

/// 2012-01-01T00:00:00Z in Cocoa seconds.
const START_SECONDS: f64 = 347_155_200.0;

const PARTICIPANTS: &[(&str, &[&str])] = &[
    ("Mark Smith", &["Mark", "Marky", "mark@example.com"]),
    ("Dan Brown", &["Dan", "dan@example.com"]),
    ("Иван Петров", &["Иван", "ivan@example.com"]),
    ("Sam Lee", &["+1 (555) 000-1111"]),
];

const EMOJIS: &[&str] = &["😀", "😂", "🤔", "🔥", "👍", "❤️", "🎉", "👨‍👩‍👧‍👦", "🏳️‍🌈"];

fn main() {
    let args: Vec<String> = env::args().collect();

    let archives: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(100);
    let messages: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(200);
    let output = args.get(3).map(String::as_str).unwrap_or("synthetic_archives");

    println!("🧪 Archive Generator");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   Archives: {}", archives);
    println!("   Messages: {} per archive", messages);
    println!("   Output:   {}", output);
    println!();

    if let Err(e) = generate(archives, messages, Path::new(output)) {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn generate(archives: usize, messages: usize, output: &Path) -> io::Result<()> {
    fs::create_dir_all(output)?;
    write_names(&output.join("names.json"))?;

    let mut rng = rand::thread_rng();
    let start = std::time::Instant::now();
    let mut bytes_written: usize = 0;

    for i in 0..archives {
        let (_, aliases) = PARTICIPANTS[i % PARTICIPANTS.len()];
        let alias = *aliases.choose(&mut rng).unwrap_or(&"Mark");
        let seconds = START_SECONDS + rng.gen_range(0.0..(3.0 * 365.0 * 86_400.0));
        let Some(opened) = datetime_from_cocoa(seconds) else {
            continue;
        };

        let name = format!(
            "{}_{} on {} at {}.ichat",
            opened.format("%Y-%m-%d"),
            alias,
            opened.format("%Y-%m-%d"),
            opened.format("%H.%M.%S")
        );
        let file = File::create(output.join(&name))?;
        let mut writer = BufWriter::with_capacity(1024 * 1024, file);
        bytes_written += write_archive(&mut writer, &mut rng, seconds, messages)?;
        writer.flush()?;

        if (i + 1) % 50 == 0 {
            eprint!("\r   Generated {}/{} archives", i + 1, archives);
        }
    }

    let elapsed = start.elapsed();
    let mb = bytes_written as f64 / 1_000_000.0;

    println!("\n\n✅ Done!");
    println!("   Size: {:.2} MB", mb);
    println!("   Time: {:.2}s", elapsed.as_secs_f64());
    Ok(())
}

fn write_names(path: &Path) -> io::Result<()> {
    let groups: serde_json::Map<String, serde_json::Value> = PARTICIPANTS
        .iter()
        .map(|(name, aliases)| ((*name).to_string(), serde_json::json!(aliases)))
        .collect();
    fs::write(path, serde_json::to_string_pretty(&groups)?)
}

/// Writes one self-started conversation and returns the bytes written.
fn write_archive(
    writer: &mut impl Write,
    rng: &mut impl Rng,
    start: f64,
    count: usize,
) -> io::Result<usize> {
    let mut out = String::with_capacity(count * 200);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(
        "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \
         \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
    );
    out.push_str(
        "<plist version=\"1.0\">\n<dict>\n\t<key>$archiver</key>\n\
         \t<string>NSKeyedArchiver</string>\n",
    );
    out.push_str("\t<key>$objects</key>\n\t<array>\n\t\t<string>$null</string>\n");
    out.push_str(&format!(
        "\t\t<string>{}</string>\n\t\t<string>E:{SELF_EMAIL}</string>\n\
         \t\t<string>e:{SELF_EMAIL}</string>\n",
        uuid(rng)
    ));

    let mut seconds = start;
    for i in 0..count {
        seconds += rng.gen_range(1.0..600.0);
        let code = if rng.gen_bool(0.5) { 3 } else { 5 };
        out.push_str("\t\t<dict>\n");
        out.push_str(&format!("\t\t\t<key>Sender</key>\n\t\t\t<integer>{code}</integer>\n"));
        // the first message always carries a time so later gaps can be filled
        if i == 0 || !rng.gen_bool(0.02) {
            out.push_str(&format!("\t\t\t<key>NS.time</key>\n\t\t\t<real>{seconds:.3}</real>\n"));
        }
        out.push_str(&format!(
            "\t\t\t<key>NS.string</key>\n\t\t\t<string>{}</string>\n",
            escape_xml_chars(&message_text(rng, i))
        ));
        if i % 40 == 39 {
            out.push_str(&format!(
                "\t\t\t<key>NS.string</key>\n\t\t\t<string>{}</string>\n",
                uuid(rng)
            ));
        }
        out.push_str("\t\t</dict>\n");
    }

    out.push_str("\t</array>\n</dict>\n</plist>\n");
    writer.write_all(out.as_bytes())?;
    Ok(out.len())
}

fn message_text(rng: &mut impl Rng, index: usize) -> String {
    match index % 12 {
        0..=4 => format!("Normal message #{} with some text", index),
        5 => format!("Message with semicolons; here; and; there; index={}", index),
        6 => format!("Message with \"quotes\" & 'apostrophes' <#{}>", index),
        7 => format!("Message with\nseveral\nlines #{}", index),
        8 => {
            let emojis: String = (0..8).map(|_| *EMOJIS.choose(rng).unwrap_or(&"🙂")).collect();
            format!("Emoji: {} #{}", emojis, index)
        }
        9 => format!("Кириллица: Привет мир! #{}", index),
        10 => format!("日本語: こんにちは #{}", index),
        _ => format!("Mixed: Hello Привет 你好 🌍 #{}", index),
    }
}

fn uuid(rng: &mut impl Rng) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        hex(rng, 8),
        hex(rng, 4),
        hex(rng, 4),
        hex(rng, 4),
        hex(rng, 12)
    )
}

fn hex(rng: &mut impl Rng, len: usize) -> String {
    (0..len).map(|_| format!("{:X}", rng.gen_range(0..16u8))).collect()
}
