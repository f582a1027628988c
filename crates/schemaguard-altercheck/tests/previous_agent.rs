use std::cell::RefCell;
use std::error::Error;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use schemaguard_altercheck::{
    AlterCheckError, AlterCheckSettings, MigrationLayout, PlayerError, PreviousDbAgent, ROLLBACK_FAILURE_NOTICE,
};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

fn write_archive(path: &Path, entries: &[(&str, &str)]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for (name, content) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

fn ok_player(_: &Path) -> Result<(), PlayerError> {
    Ok(())
}

fn agent(temp: &TempDir) -> PreviousDbAgent<fn(&Path) -> Result<(), PlayerError>> {
    PreviousDbAgent::new(
        MigrationLayout::new(temp.path().join("migration")),
        ok_player as fn(&Path) -> Result<(), PlayerError>,
    )
}

#[test]
fn empty_previous_dir_extracts_nothing() {
    let temp = TempDir::new().unwrap();
    let agent = agent(&temp);

    assert!(!agent.extract_previous_resource().unwrap());
    assert_eq!(agent.find_latest_previous_archive().unwrap(), None);
    assert_eq!(agent.find_latest_previous_date().unwrap(), None);

    fs::create_dir_all(agent.layout().previous_dir()).unwrap();
    assert!(!agent.extract_previous_resource().unwrap());
}

#[test]
fn latest_archive_is_lexically_greatest() {
    let temp = TempDir::new().unwrap();
    let agent = agent(&temp);
    let previous_dir = agent.layout().previous_dir().to_path_buf();
    write_archive(&previous_dir.join("previous-20230101.zip"), &[("a.sql", "a")]);
    write_archive(&previous_dir.join("previous-20230215.zip"), &[("b.sql", "b")]);
    fs::write(previous_dir.join("notes.txt"), "not an archive").unwrap();

    assert_eq!(
        agent.find_latest_previous_archive().unwrap(),
        Some(previous_dir.join("previous-20230215.zip"))
    );
    assert_eq!(agent.find_previous_archives().unwrap().len(), 2);
    assert_eq!(
        agent.find_latest_previous_date().unwrap().as_deref(),
        Some("20230215")
    );
}

#[test]
fn extraction_replaces_stale_resource_and_keeps_archives() {
    let temp = TempDir::new().unwrap();
    let agent = agent(&temp);
    let previous_dir = agent.layout().previous_dir().to_path_buf();
    let archive = previous_dir.join("previous-20230215.zip");
    write_archive(
        &archive,
        &[
            ("playsql/replace-schema.sql", "create table MEMBER (MEMBER_ID integer);"),
            ("playsql/take-finally.sql", "select 1;"),
        ],
    );
    fs::create_dir_all(previous_dir.join("playsql")).unwrap();
    fs::write(previous_dir.join("playsql/stale.sql"), "drop table MEMBER;").unwrap();

    assert!(agent.extract_previous_resource().unwrap());
    assert!(archive.exists());
    assert!(!previous_dir.join("playsql/stale.sql").exists());
    assert!(previous_dir.join("playsql/replace-schema.sql").exists());
    assert!(previous_dir.join("playsql/take-finally.sql").exists());

    agent.delete_extracted_previous_resource().unwrap();
    assert!(archive.exists());
    assert!(!previous_dir.join("playsql/replace-schema.sql").exists());
}

#[test]
fn archive_entries_named_like_archives_are_not_extracted() {
    let temp = TempDir::new().unwrap();
    let agent = agent(&temp);
    let previous_dir = agent.layout().previous_dir().to_path_buf();
    let archive = previous_dir.join("previous-20230215.zip");
    write_archive(
        &archive,
        &[
            ("previous-20991231.zip", "bundled by mistake"),
            ("replace-schema.sql", "create table MEMBER (MEMBER_ID integer);"),
        ],
    );

    assert!(agent.extract_previous_resource().unwrap());
    assert!(!previous_dir.join("previous-20991231.zip").exists());
    assert!(previous_dir.join("replace-schema.sql").exists());
    assert_eq!(agent.find_latest_previous_archive().unwrap(), Some(archive));
}

#[test]
fn empty_archive_is_fatal() {
    let temp = TempDir::new().unwrap();
    let agent = agent(&temp);
    write_archive(
        &agent.layout().previous_dir().join("previous-20230101.zip"),
        &[],
    );

    let err = agent.extract_previous_resource().unwrap_err();
    assert!(matches!(err, AlterCheckError::EmptyArchive { .. }));
    assert!(err.to_string().contains("previous-20230101.zip"));
}

#[test]
fn marking_ng_twice_keeps_first_notice() {
    let temp = TempDir::new().unwrap();
    let agent = agent(&temp);

    agent.mark_previous_ng("x").unwrap();
    agent.mark_previous_ng("y").unwrap();

    let ng_mark = agent.layout().previous_ng_mark();
    assert_eq!(fs::read_to_string(ng_mark).unwrap(), "x\n");
    let marks: Vec<PathBuf> = fs::read_dir(agent.layout().migration_dir())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(marks, vec![ng_mark.to_path_buf()]);
}

#[test]
fn ng_and_ok_marks_exclude_each_other() {
    let temp = TempDir::new().unwrap();
    let agent = agent(&temp);

    agent.mark_previous_ok("verified").unwrap();
    assert!(agent.has_previous_ok_mark());

    agent.mark_previous_ng("broken").unwrap();
    assert!(agent.has_previous_ng_mark());
    assert!(!agent.has_previous_ok_mark());

    agent.mark_previous_ok("verified again").unwrap();
    assert!(!agent.has_previous_ng_mark());
    assert!(agent.has_previous_ok_mark());
}

#[test]
fn extracted_resource_cleanup_leaves_marks() {
    let temp = TempDir::new().unwrap();
    let agent = agent(&temp);
    write_archive(
        &agent.layout().previous_dir().join("previous-20230101.zip"),
        &[("replace-schema.sql", "create table MEMBER (MEMBER_ID integer);")],
    );
    agent.mark_previous_ng("broken").unwrap();

    agent.extract_previous_resource().unwrap();
    agent.delete_extracted_previous_resource().unwrap();

    assert!(agent.has_previous_ng_mark());
}

#[test]
fn rollback_plays_extracted_resource_and_cleans_up() {
    let temp = TempDir::new().unwrap();
    let layout = MigrationLayout::new(temp.path().join("migration"));
    write_archive(
        &layout.previous_dir().join("previous-20230215.zip"),
        &[("replace-schema.sql", "create table MEMBER (MEMBER_ID integer);")],
    );

    let seen = RefCell::new(Vec::new());
    let player = |dir: &Path| -> Result<(), PlayerError> {
        let ddl = fs::read_to_string(dir.join("replace-schema.sql"))?;
        seen.borrow_mut().push(ddl);
        Ok(())
    };
    let agent = PreviousDbAgent::new(layout.clone(), player);
    agent.mark_previous_ng("last run failed").unwrap();

    assert!(agent.rollback_previous_schema().unwrap());
    assert!(!agent.has_previous_ng_mark());
    assert!(!layout.previous_dir().join("replace-schema.sql").exists());
    assert_eq!(
        *seen.borrow(),
        vec!["create table MEMBER (MEMBER_ID integer);".to_string()]
    );
}

#[test]
fn rollback_without_archive_is_not_an_error() {
    let temp = TempDir::new().unwrap();
    let agent = agent(&temp);

    assert!(!agent.rollback_previous_schema().unwrap());
    assert!(!agent.has_previous_ng_mark());
}

#[test]
fn failed_replay_marks_ng_and_wraps_cause() {
    let temp = TempDir::new().unwrap();
    let layout = MigrationLayout::new(temp.path().join("migration"));
    write_archive(
        &layout.previous_dir().join("previous-20230215.zip"),
        &[("replace-schema.sql", "create tabel MEMBER;")],
    );
    let player = |_: &Path| -> Result<(), PlayerError> { Err("syntax error at 'tabel'".into()) };
    let agent = PreviousDbAgent::new(layout.clone(), player);

    let err = agent.rollback_previous_schema().unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with(ROLLBACK_FAILURE_NOTICE));
    assert!(message.contains("So you should prepare the PreviousDDL again."));

    let cause = err.source().expect("rollback failure keeps its cause");
    assert!(cause.to_string().contains("syntax error at 'tabel'"));
    assert!(matches!(
        err,
        AlterCheckError::RollbackFailure { ref source, .. } if matches!(**source, AlterCheckError::Play(_))
    ));

    assert_eq!(
        fs::read_to_string(layout.previous_ng_mark()).unwrap(),
        format!("{ROLLBACK_FAILURE_NOTICE}\n")
    );
    assert!(!layout.previous_dir().join("replace-schema.sql").exists());
}

#[test]
fn failed_replay_keeps_rollback_failure_when_marking_fails() {
    let temp = TempDir::new().unwrap();
    let settings = AlterCheckSettings {
        migration_dir: temp.path().join("migration"),
        previous_ng_mark: None,
        previous_ok_mark: Some(temp.path().join("ok-mark-dir")),
    };
    let layout = MigrationLayout::from_settings(&settings);
    fs::create_dir_all(layout.previous_ok_mark()).unwrap();
    write_archive(
        &layout.previous_dir().join("previous-20230215.zip"),
        &[("replace-schema.sql", "create tabel MEMBER;")],
    );
    let player = |_: &Path| -> Result<(), PlayerError> { Err("syntax error".into()) };
    let agent = PreviousDbAgent::new(layout.clone(), player);

    let err = agent.rollback_previous_schema().unwrap_err();
    assert!(matches!(err, AlterCheckError::RollbackFailure { .. }));
    assert!(err.to_string().starts_with(ROLLBACK_FAILURE_NOTICE));
    let cause = err.source().expect("rollback failure keeps its cause");
    assert!(cause.to_string().contains("syntax error"));
    assert!(!layout.previous_dir().join("replace-schema.sql").exists());
}

#[test]
fn play_failure_surfaces_to_caller() {
    let temp = TempDir::new().unwrap();
    let player = |_: &Path| -> Result<(), PlayerError> { Err("database is down".into()) };
    let agent = PreviousDbAgent::new(MigrationLayout::new(temp.path()), player);

    let err = agent.play_previous_schema().unwrap_err();
    assert!(matches!(err, AlterCheckError::Play(_)));

    let wrapped = agent.rollback_failure(err);
    assert!(wrapped.to_string().contains("[Advice]"));
}
