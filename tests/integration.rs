//! Integration tests: archives on disk through to the merged corpus.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use ichatpack::archive::converted_name;
use ichatpack::prelude::*;
use tempfile::tempdir;

// ============================================================================
// Fixtures
// ============================================================================

const UUID: &str = "5F3C2A10-1B2C-4D5E-8F90-A1B2C3D4E5F6";
const SECOND_UUID: &str = "0A1B2C3D-4E5F-6071-8293-A4B5C6D7E8F9";

/// 2014-03-01T12:00:00Z in Cocoa seconds.
const MARCH_1: f64 = 415_368_000.0;

fn thread_start(uuid: &str, marker: &str) -> String {
    let account = marker.trim_start_matches("e:");
    format!(
        "\t\t<string>{uuid}</string>\n\t\t<string>E:{account}</string>\n\
         \t\t<string>{marker}</string>\n"
    )
}

fn message(code: i64, seconds: f64, text: &str) -> String {
    format!(
        "\t\t<dict>\n\t\t\t<key>Sender</key>\n\t\t\t<integer>{code}</integer>\n\
         \t\t\t<key>NS.time</key>\n\t\t\t<real>{seconds}</real>\n\t\t\t<key>NS.string</key>\n\
         \t\t\t<string>{text}</string>\n\t\t</dict>\n"
    )
}

/// Wraps object-table rows the way `plutil -convert xml1` lays them out.
fn plist(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \
         \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n\
         <plist version=\"1.0\">\n<dict>\n\t<key>$archiver</key>\n\
         \t<string>NSKeyedArchiver</string>\n\t<key>$objects</key>\n\t<array>\n\
         \t\t<string>$null</string>\n{body}\t</array>\n</dict>\n</plist>\n"
    )
}

fn self_started(messages: &[(i64, f64, &str)]) -> String {
    let mut body = thread_start(UUID, "e:me@example.com");
    for (code, seconds, text) in messages {
        body.push_str(&message(*code, *seconds, text));
    }
    plist(&body)
}

fn config() -> ArchiveConfig {
    ArchiveConfig::default().with_identity(SelfIdentity::new("me@example.com", "Jane Doe", "Me"))
}

fn groups() -> NameGroups {
    NameGroups::from_json_str(
        r#"{"Mark Smith": ["Mark", "Marky", "mark@example.com"], "Dan": ["Dan"]}"#,
    )
    .unwrap()
}

fn parser() -> IChatParser {
    IChatParser::with_config(config(), groups())
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    fs::write(dir.join(name), content).unwrap();
    name.to_string()
}

fn texts(messages: &[Message]) -> Vec<&str> {
    messages.iter().map(Message::message).collect()
}

// ============================================================================
// Single archives
// ============================================================================

#[test]
fn test_single_archive_through_parser_trait() {
    let dir = tempdir().unwrap();
    let name = write(
        dir.path(),
        "2014-03-01_Mark on 2014-03-01 at 12.00.00.ichat",
        &self_started(&[(3, MARCH_1 + 60.0, "lunch?"), (5, MARCH_1 + 120.0, "sure")]),
    );

    let messages = parser().parse(&dir.path().join(name)).unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, "Me");
    assert_eq!(messages[1].sender, "Mark Smith");
    assert_eq!(
        messages[0].timestamp,
        Utc.with_ymd_and_hms(2014, 3, 1, 12, 1, 0).unwrap()
    );
    assert!(!messages[0].is_timestamp_inferred);
}

#[test]
fn test_other_side_started_thread() {
    let mut body = thread_start(UUID, "mark@example.com");
    body.push_str(&message(2, MARCH_1, "hey"));
    body.push_str(&message(4, MARCH_1 + 1.0, "hi"));

    let parsed = parser()
        .parse_archive(
            &plist(&body),
            "2014-03-01_Mark on 2014-03-01 at 12.00.00.ichat",
        )
        .unwrap();
    assert_eq!(parsed.messages[0].sender, "Mark Smith");
    assert_eq!(parsed.messages[1].sender, "Me");
}

#[test]
fn test_two_thread_archive() {
    let mut body = thread_start(UUID, "e:me@example.com");
    body.push_str(&message(3, MARCH_1, "first thread"));
    body.push_str(&thread_start(SECOND_UUID, "mark@example.com"));
    body.push_str(&message(20, MARCH_1 + 3600.0, "second thread"));

    let parsed = parser()
        .parse_archive(
            &plist(&body),
            "2014-03-01_Mark on 2014-03-01 at 12.00.00.ichat",
        )
        .unwrap();
    assert_eq!(parsed.messages.len(), 2);
    assert_eq!(parsed.messages[0].sender, "Me");
    assert_eq!(parsed.messages[1].sender, "Mark Smith");
}

#[test]
fn test_records_sorted_by_timestamp() {
    let text = self_started(&[(3, MARCH_1 + 50.0, "late"), (5, MARCH_1 + 10.0, "early")]);
    let parsed = parser()
        .parse_archive(&text, "2014-03-01_Mark on 2014-03-01 at 12.00.00.ichat")
        .unwrap();
    assert_eq!(texts(&parsed.messages), vec!["early", "late"]);
}

#[test]
fn test_group_count_matches_records() {
    use ichatpack::assembler::assemble;
    use ichatpack::normalizer::normalize;

    let text = self_started(&[(3, MARCH_1, "a"), (5, MARCH_1 + 1.0, "b"), (3, MARCH_1 + 2.0, "c")]);
    let participant = groups().participant("Mark");
    let normalized = normalize(&text, &participant, &config()).unwrap();
    assert_eq!(normalized.values.len() % 3, 0);

    let messages = assemble(&normalized, &participant, &config()).unwrap();
    assert_eq!(messages.len(), normalized.group_count());
}

// ============================================================================
// Batches
// ============================================================================

#[test]
fn test_aliases_merge_into_one_owner() {
    let dir = tempdir().unwrap();
    let names = vec![
        write(
            dir.path(),
            "2014-03-01_Mark on 2014-03-01 at 12.00.00.ichat",
            &self_started(&[(3, MARCH_1, "from file one")]),
        ),
        write(
            dir.path(),
            "2014-03-02_Marky on 2014-03-02 at 12.00.00.ichat",
            &self_started(&[(3, MARCH_1 + 86_400.0, "from file two")]),
        ),
        write(
            dir.path(),
            "2014-03-02_Dan on 2014-03-02 at 13.00.00.ichat",
            &self_started(&[(3, MARCH_1, "to dan")]),
        ),
    ];

    let report = parse_files(dir.path(), &names, &parser(), None).unwrap();
    assert_eq!(
        report.corpus.owners().collect::<Vec<_>>(),
        vec!["Dan", "Mark Smith"]
    );
    assert_eq!(
        texts(report.corpus.get("Mark Smith").unwrap()),
        vec!["from file one", "from file two"]
    );
}

#[test]
fn test_overlapping_archives_are_deduplicated() {
    let dir = tempdir().unwrap();
    let shared = [(3, MARCH_1, "hi"), (5, MARCH_1 + 5.0, "hello")];
    let names = vec![
        write(
            dir.path(),
            "2014-03-01_Mark on 2014-03-01 at 12.00.00.ichat",
            &self_started(&shared),
        ),
        write(
            dir.path(),
            "2014-03-01_Marky on 2014-03-01 at 12.00.00.ichat",
            &self_started(&[shared[0], shared[1], (3, MARCH_1 + 9.0, "new")]),
        ),
    ];

    let report = parse_files(dir.path(), &names, &parser(), None).unwrap();
    assert_eq!(report.stats.original_count, 5);
    assert_eq!(report.stats.deduped_count, 3);
    assert_eq!(
        texts(report.corpus.get("Mark Smith").unwrap()),
        vec!["hi", "hello", "new"]
    );
}

#[test]
fn test_broken_archive_is_reported_not_fatal() {
    let dir = tempdir().unwrap();
    let names = vec![
        write(
            dir.path(),
            "2014-03-01_Mark on 2014-03-01 at 12.00.00.ichat",
            &self_started(&[(3, MARCH_1, "fine")]),
        ),
        write(
            dir.path(),
            "2014-03-02_Dan on 2014-03-02 at 12.00.00.ichat",
            &plist(&format!("\t\t<string>{UUID}</string>\n\t\t<string>E:</string>\n")),
        ),
    ];

    let report = parse_files(dir.path(), &names, &parser(), None).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.is_structural());
    assert!(report.failures[0].error.to_string().contains("Dan on 2014-03-02"));
    assert_eq!(
        report.corpus.owners().collect::<Vec<_>>(),
        vec!["Mark Smith"]
    );
}

#[test]
fn test_conflicting_name_groups_are_rejected() {
    let err = NameGroups::from_json_str(r#"{"Mark Smith": ["Mark"], "Mark Jones": ["Mark"]}"#)
        .unwrap_err();
    assert!(err.is_batch_fatal());
}

// ============================================================================
// Copy then parse
// ============================================================================

/// Stands in for plutil: the fixture archives are already XML.
struct CopyConverter;

impl Converter for CopyConverter {
    fn convert(&self, source: &Path, dest_dir: &Path) -> ichatpack::Result<PathBuf> {
        let dest = dest_dir.join(converted_name(source)?);
        fs::copy(source, &dest)?;
        Ok(dest)
    }
}

#[test]
fn test_copy_then_parse_directory() {
    let raw = tempdir().unwrap();
    let out = tempdir().unwrap();

    let day = raw.path().join("2013-05-01");
    fs::create_dir_all(&day).unwrap();
    // the -1 snapshot is the complete one and the only one kept
    fs::write(
        day.join("Mark on 2013-05-01 at 09.00.00.ichat"),
        self_started(&[(3, MARCH_1 - 2.0e7, "partial")]),
    )
    .unwrap();
    fs::write(
        day.join("Mark on 2013-05-01 at 09.00.00-1.ichat"),
        self_started(&[(3, MARCH_1 - 2.0e7, "partial"), (5, MARCH_1 - 1.9e7, "complete")]),
    )
    .unwrap();
    fs::write(day.join(".DS_Store"), "junk").unwrap();

    let converted =
        copy_archives(raw.path(), out.path(), &[2013], &CopyConverter, &config()).unwrap();
    assert_eq!(
        converted,
        vec!["2013-05-01_Mark on 2013-05-01 at 09.00.00-1.ichat"]
    );

    let listed = list_archives(out.path(), &[2013], ".ichat").unwrap();
    assert_eq!(listed, converted);

    let report = parse_directory(out.path(), &[2013], &parser(), None).unwrap();
    assert_eq!(
        texts(report.corpus.get("Mark Smith").unwrap()),
        vec!["partial", "complete"]
    );
}

// ============================================================================
// Downstream: filters, search, output
// ============================================================================

fn sample_corpus() -> Vec<Message> {
    let dir = tempdir().unwrap();
    let names = vec![write(
        dir.path(),
        "2014-03-01_Mark on 2014-03-01 at 12.00.00.ichat",
        &self_started(&[
            (3, MARCH_1, "lunch at noon?"),
            (5, MARCH_1 + 60.0, "Lunch sounds good"),
            (3, MARCH_1 + 86_400.0 * 3.0, "call me at 5551234"),
        ]),
    )];
    parse_files(dir.path(), &names, &parser(), None)
        .unwrap()
        .corpus
        .all_messages()
}

#[test]
fn test_filters_on_parsed_records() {
    let messages = sample_corpus();

    let by_date = FilterConfig::new().with_date_from("2014-03-02").unwrap();
    assert_eq!(
        texts(&apply_filters(messages.clone(), &by_date)),
        vec!["call me at 5551234"]
    );

    let by_sender = FilterConfig::new().with_sender("Mark Smith");
    assert_eq!(
        texts(&apply_filters(messages, &by_sender)),
        vec!["Lunch sounds good"]
    );
}

#[test]
fn test_search_parsed_records() {
    let messages = sample_corpus();

    let hits = search(&messages, "lunch", &SearchOptions::default()).unwrap();
    assert_eq!(hits.len(), 2);

    let hits = search(
        &messages,
        r"at (\d+)",
        &SearchOptions::new().with_regex().with_group(1),
    )
    .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].matched(&messages), Some("5551234"));
}

#[test]
fn test_csv_output_roundtrip_fields() {
    let messages = sample_corpus();
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.csv");
    write_csv(
        &messages,
        path.to_str().unwrap(),
        &OutputConfig::new().with_timestamps(),
    )
    .unwrap();

    let mut reader = csv::ReaderBuilder::new().delimiter(b';').from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["Timestamp", "Sender", "Message"]
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(|row| row.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][0], "2014-03-01 12:00:00");
    assert_eq!(&rows[0][1], "Me");
}

#[test]
fn test_json_output_fields() {
    let messages = sample_corpus();
    let json = to_json(&messages, &OutputConfig::new().with_timestamps()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    let first = &parsed[0];
    assert_eq!(first["sender"], "Me");
    assert_eq!(first["message"], "lunch at noon?");
    assert_eq!(first["timestamp"], "2014-03-01T12:00:00Z");
    assert!(first.get("sender_id").is_none());
}

#[test]
fn test_debug_metadata_in_jsonl() {
    let dir = tempdir().unwrap();
    let file = "2014-03-01_Mark on 2014-03-01 at 12.00.00.ichat";
    let names = vec![write(dir.path(), file, &self_started(&[(3, MARCH_1, "hi")]))];
    let parser = IChatParser::with_config(config().with_debug_mode(true), groups());

    let messages = parse_files(dir.path(), &names, &parser, None).unwrap().corpus.all_messages();
    let line = to_jsonl(&messages, &OutputConfig::all()).unwrap();
    let record: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(record["sender_id"], 3);
    assert_eq!(record["source_file"], file);
    assert_eq!(record["is_timestamp_inferred"], false);
}

#[test]
fn test_config_from_json_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ichatpack.json");
    fs::write(
        &path,
        r#"{
            "identity": {"email": "me@example.com", "name": "Jane Doe", "display_name": "Me"},
            "debug_mode": true
        }"#,
    )
    .unwrap();

    let loaded = ArchiveConfig::from_json_file(&path).unwrap();
    assert_eq!(loaded.identity, config().identity);
    assert!(loaded.debug_mode);
    assert_eq!(loaded.file_suffix, ".ichat");
}
