use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::sync::Arc;

use tempfile::TempDir;

const PASSPHRASE: &str = "test-passphrase-secure-123";
const ITERATIONS: &str = "100000";

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_sealnote"))
}

/// One isolated "device": its own config, data dir and store.
struct Device {
    dir: TempDir,
}

impl Device {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir should succeed"),
        }
    }

    fn store(&self) -> PathBuf {
        self.dir.path().join("data").join("notes.db")
    }

    fn config_home(&self) -> PathBuf {
        self.dir.path().join("config")
    }

    fn write_config(&self, contents: &str) {
        let path = self.config_home().join("sealnote").join("config.toml");
        std::fs::create_dir_all(path.parent().expect("config parent"))
            .expect("create config dir should succeed");
        std::fs::write(path, contents).expect("write config should succeed");
    }

    fn cmd(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(bin());
        cmd.args(args)
            .env_remove("SEALNOTE_PASSPHRASE")
            .env_remove("SEALNOTE_NEW_PASSPHRASE")
            .env_remove("SEALNOTE_CONFIG")
            .env("SEALNOTE_STORE", self.store())
            .env("XDG_CONFIG_HOME", self.config_home())
            .env("XDG_DATA_HOME", self.dir.path().join("data"))
            .env("HOME", self.dir.path());
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.cmd(args)
            .env("SEALNOTE_PASSPHRASE", PASSPHRASE)
            .output()
            .expect("run should succeed")
    }

    fn init(&self) {
        let out = self.run(&["init", "--iterations", ITERATIONS]);
        assert!(out.status.success(), "init failed: {}", stderr(&out));
    }

    fn add(&self, text: &str) -> String {
        let out = self.run(&["add", "--text", text]);
        assert!(out.status.success(), "add failed: {}", stderr(&out));
        stdout(&out)
            .trim()
            .strip_prefix("Added note ")
            .expect("add output should name the note")
            .to_string()
    }
}

/// Run `cmd` with `input` on stdin.
fn run_piped(mut cmd: Command, input: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn should succeed");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(input.as_bytes())
        .expect("write stdin should succeed");
    child.wait_with_output().expect("wait should succeed")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).to_string()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).to_string()
}

fn json(out: &Output) -> serde_json::Value {
    serde_json::from_slice(&out.stdout).expect("output should be JSON")
}

#[test]
fn test_cli_init_add_list_show() {
    let device = Device::new();
    device.init();
    assert!(device.store().exists());

    let first = device.add("Hello from CLI");
    let second = device.add("Second note\nwith a body");

    let list = device.run(&["list", "--json"]);
    assert!(list.status.success());
    let notes = json(&list);
    let notes = notes.as_array().expect("list output array");
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0]["id"], second.as_str());
    assert_eq!(notes[1]["id"], first.as_str());

    let show = device.run(&["show", &first]);
    assert!(show.status.success());
    assert!(stdout(&show).contains("Hello from CLI"));

    let show = device.run(&["show", &second, "--json"]);
    assert_eq!(json(&show)["text"], "Second note\nwith a body");
}

#[test]
fn test_cli_store_never_holds_plaintext() {
    let device = Device::new();
    device.init();
    device.add("a very recognisable secret");

    let bytes = std::fs::read(device.store()).expect("read store should succeed");
    let haystack = String::from_utf8_lossy(&bytes);
    assert!(!haystack.contains("recognisable secret"));
    assert!(!haystack.contains(PASSPHRASE));
}

#[test]
fn test_cli_init_writes_default_config() {
    let device = Device::new();
    device.init();

    let config_path = device.config_home().join("sealnote").join("config.toml");
    let contents = std::fs::read_to_string(config_path).expect("config should exist");
    assert!(contents.contains("[store]"));
    assert!(contents.contains("iterations = 100000"));
    assert!(contents.contains("[relay]"));
}

#[test]
fn test_cli_init_twice_refused() {
    let device = Device::new();
    device.init();
    let again = device.run(&["init", "--iterations", ITERATIONS]);
    assert_eq!(again.status.code(), Some(4));
}

#[test]
fn test_cli_init_rejects_short_passphrase() {
    let device = Device::new();
    let out = device
        .cmd(&["init", "--iterations", ITERATIONS])
        .env("SEALNOTE_PASSPHRASE", "short")
        .output()
        .expect("run should succeed");
    assert_eq!(out.status.code(), Some(4));
}

#[test]
fn test_cli_wrong_passphrase_exit_code() {
    let device = Device::new();
    device.init();

    let out = device
        .cmd(&["list"])
        .env("SEALNOTE_PASSPHRASE", "not-the-passphrase-123")
        .output()
        .expect("run should succeed");
    assert_eq!(out.status.code(), Some(5));
    assert!(stderr(&out).contains("Incorrect passphrase"));
}

#[test]
fn test_cli_no_passphrase_without_tty() {
    let device = Device::new();
    device.init();

    let out = device.cmd(&["list"]).output().expect("run should succeed");
    assert_eq!(out.status.code(), Some(4));
    assert!(stderr(&out).contains("SEALNOTE_PASSPHRASE"));
}

#[test]
fn test_cli_missing_store_message() {
    let device = Device::new();
    let out = device.run(&["list"]);
    assert_eq!(out.status.code(), Some(3));
    assert!(stderr(&out).contains("sealnote init"));
}

#[test]
fn test_cli_show_errors() {
    let device = Device::new();
    device.init();

    let missing = device.run(&["show", "00000000-0000-4000-8000-000000000000"]);
    assert_eq!(missing.status.code(), Some(3));

    let invalid = device.run(&["show", "nope"]);
    assert_eq!(invalid.status.code(), Some(4));
}

#[test]
fn test_cli_edit_and_delete() {
    let device = Device::new();
    device.init();
    let id = device.add("first draft");

    let edit = device.run(&["edit", &id, "--text", "final draft"]);
    assert!(edit.status.success(), "edit failed: {}", stderr(&edit));

    let show = device.run(&["show", &id, "--json"]);
    let value = json(&show);
    assert_eq!(value["text"], "final draft");

    let delete = device.run(&["delete", &id, "--force"]);
    assert!(delete.status.success());

    let show = device.run(&["show", &id]);
    assert_eq!(show.status.code(), Some(3));
}

#[test]
fn test_cli_edit_leaves_no_plaintext_files() {
    let device = Device::new();
    device.init();
    let tmp = device.dir.path().join("tmp");
    std::fs::create_dir_all(&tmp).expect("create tmp should succeed");

    let add = device
        .cmd(&["add"])
        .env("TMPDIR", &tmp)
        .env("EDITOR", "true")
        .env("SEALNOTE_PASSPHRASE", PASSPHRASE)
        .stdin(Stdio::null())
        .output()
        .expect("run should succeed");
    assert_eq!(add.status.code(), Some(4));

    let id = device.add("before the edit");
    let mut cmd = device.cmd(&["edit", &id]);
    cmd.env("TMPDIR", &tmp)
        .env("EDITOR", "true")
        .env("SEALNOTE_PASSPHRASE", PASSPHRASE);
    let edit = run_piped(cmd, "after the edit\n");
    assert!(edit.status.success(), "edit failed: {}", stderr(&edit));

    let show = device.run(&["show", &id, "--json"]);
    assert_eq!(json(&show)["text"], "after the edit");

    let leftovers: Vec<_> = std::fs::read_dir(&tmp)
        .expect("read tmp should succeed")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("sealnote_"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_cli_passwd_keeps_notes() {
    let device = Device::new();
    device.init();
    let id = device.add("survives rotation");

    let new_passphrase = "another-passphrase-456";
    let passwd = device
        .cmd(&["passwd"])
        .env("SEALNOTE_PASSPHRASE", PASSPHRASE)
        .env("SEALNOTE_NEW_PASSPHRASE", new_passphrase)
        .output()
        .expect("run should succeed");
    assert!(passwd.status.success(), "passwd failed: {}", stderr(&passwd));

    let old = device.run(&["show", &id]);
    assert_eq!(old.status.code(), Some(5));

    let new = device
        .cmd(&["show", &id])
        .env("SEALNOTE_PASSPHRASE", new_passphrase)
        .output()
        .expect("run should succeed");
    assert!(new.status.success());
    assert!(stdout(&new).contains("survives rotation"));
}

#[test]
fn test_cli_export_import_round_trip() {
    let source = Device::new();
    source.init();
    let id = source.add("backed up");
    let backup_path = source.dir.path().join("backup.json");
    let backup_arg = backup_path.to_string_lossy().to_string();

    let export = source.run(&["export", &backup_arg]);
    assert!(export.status.success(), "export failed: {}", stderr(&export));
    let backup: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&backup_path).expect("backup should exist"))
            .expect("backup should be JSON");
    assert_eq!(backup["version"], 1);
    assert!(!backup.to_string().contains("backed up"));

    let again = source.run(&["export", &backup_arg]);
    assert_eq!(again.status.code(), Some(4));

    // Fresh device: the backup installs the master key.
    let restored = Device::new();
    let import = restored.run(&["import", &backup_arg]);
    assert!(import.status.success(), "import failed: {}", stderr(&import));
    assert!(stdout(&import).contains("Installed master key"));

    let show = restored.run(&["show", &id]);
    assert!(show.status.success());
    assert!(stdout(&show).contains("backed up"));

    // A device with its own key refuses the foreign lineage.
    let other = Device::new();
    other.init();
    let conflict = other.run(&["import", &backup_arg]);
    assert_eq!(conflict.status.code(), Some(4));
    assert!(stderr(&conflict).contains("different master key"));
}

#[test]
fn test_cli_list_shows_undecryptable_notes() {
    let source = Device::new();
    source.init();
    source.add("first");
    source.add("second");
    let backup_path = source.dir.path().join("backup.json");
    let backup_arg = backup_path.to_string_lossy().to_string();
    assert!(source.run(&["export", &backup_arg]).status.success());

    // Swap the nonces so the first note no longer authenticates.
    let mut backup: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&backup_path).expect("backup should exist"))
            .expect("backup should be JSON");
    let other_iv = backup["notes"][1]["iv"].clone();
    backup["notes"][0]["iv"] = other_iv;
    std::fs::write(&backup_path, backup.to_string()).expect("write backup should succeed");
    let broken_id = backup["notes"][0]["id"].as_str().expect("note id").to_string();

    let restored = Device::new();
    assert!(restored.run(&["import", &backup_arg]).status.success());

    let list = restored.run(&["list", "--json"]);
    assert!(list.status.success(), "list failed: {}", stderr(&list));
    let notes = json(&list);
    let notes = notes.as_array().expect("list output array");
    assert_eq!(notes.len(), 2);
    let broken = notes
        .iter()
        .find(|note| note["id"] == broken_id.as_str())
        .expect("broken note should be listed");
    assert_eq!(broken["error"], "cannot decrypt");
    assert!(notes.iter().any(|note| note["text"].is_string()));
}

#[test]
fn test_cli_unlock_remote_requires_credentials() {
    let device = Device::new();
    device.init();
    let out = device.run(&["unlock-remote", "--timeout", "1"]);
    assert_eq!(out.status.code(), Some(3));
}

/// Run the relay on a background runtime and return its base URL.
fn spawn_relay() -> String {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("runtime should start");
        runtime.block_on(async move {
            let state = Arc::new(sealnote_relay::state::AppState::new(
                sealnote_relay::config::Config::default(),
            ));
            let app = sealnote_relay::create_router(state);
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind should succeed");
            tx.send(listener.local_addr().expect("local addr"))
                .expect("send should succeed");
            let _ = axum::serve(listener, app).await;
        });
    });
    let addr = rx.recv().expect("relay should report its address");
    format!("http://{}", addr)
}

#[test]
fn test_cli_remote_unlock_end_to_end() {
    let relay_url = spawn_relay();
    let config = format!(
        "[relay]\nurl = \"{}\"\npoll_interval_ms = 200\n",
        relay_url
    );

    let laptop = Device::new();
    laptop.write_config(&config);
    laptop.init();
    let phone = Device::new();
    phone.write_config(&config);

    // Enrol the phone's key with the laptop's store.
    let init = phone.run(&["authenticator", "init"]);
    assert!(init.status.success(), "authenticator init failed: {}", stderr(&init));

    let challenge = laptop.run(&["credential", "challenge"]);
    assert!(challenge.status.success());
    let challenge = stdout(&challenge).trim().to_string();

    let response = phone.run(&["authenticator", "register", &challenge]);
    assert!(response.status.success());
    let response_path = laptop.dir.path().join("response.json");
    std::fs::write(&response_path, &response.stdout).expect("write response should succeed");

    let register = laptop.run(&["credential", "register", &response_path.to_string_lossy()]);
    assert!(register.status.success(), "register failed: {}", stderr(&register));

    let replay = laptop.run(&["credential", "register", &response_path.to_string_lossy()]);
    assert_eq!(replay.status.code(), Some(3));

    let list = laptop.run(&["credential", "list", "--json"]);
    assert_eq!(json(&list).as_array().map(Vec::len), Some(1));

    // Laptop waits; phone answers through the relay.
    let mut waiting = laptop
        .cmd(&["unlock-remote", "--timeout", "60"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn should succeed");
    let mut reader = BufReader::new(waiting.stdout.take().expect("stdout should be piped"));
    let mut uri = String::new();
    reader.read_line(&mut uri).expect("read link should succeed");
    let uri = uri.trim().to_string();
    assert!(uri.starts_with("sealnote://unlock?"));

    let answer = phone.run(&["respond", &uri]);
    assert!(answer.status.success(), "respond failed: {}", stderr(&answer));

    let status = waiting.wait().expect("wait should succeed");
    let mut rest = String::new();
    reader.read_to_string(&mut rest).expect("read output should succeed");
    assert!(status.success());
    assert!(rest.contains("Authenticated with credential"));

    // The session is answered; a second response is refused.
    let again = phone.run(&["respond", &uri]);
    assert!(!again.status.success());

    let show = phone.run(&["authenticator", "show"]);
    assert!(stdout(&show).contains("Counter: 1"));
}
