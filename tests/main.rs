//! End-to-end tests driving a real server over loopback.
//!
//! Most tests use the async_ftp client; the protocol-ordering cases
//! (RNFR/RNTO interleaving, ABOR, REST+STOR) speak raw FTP over a
//! `std::net::TcpStream` dialogue helper, because a full client hides
//! exactly the sequencing under test.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use ftplet::{auth::Permissions, Server};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

const IO_TIMEOUT: Duration = Duration::from_secs(10);

struct Harness {
    server: Server,
    addr: String,
    root: PathBuf,
    _tempdir: tempfile::TempDir,
}

fn harness_with<F>(setup: F) -> Harness
where
    F: FnOnce(&mut Server, &std::path::Path),
{
    let tempdir = tempfile::TempDir::new().unwrap();
    let root = tempdir.path().to_path_buf();
    let mut server = Server::new("127.0.0.1", 0);
    setup(&mut server, &root);
    assert!(server.start(2));
    let addr = format!("127.0.0.1:{}", server.port());
    Harness {
        server,
        addr,
        root,
        _tempdir: tempdir,
    }
}

#[fixture]
fn harness() -> Harness {
    harness_with(|server, root| {
        assert!(server.add_user("hoi", "jij", root, Permissions::ALL));
    })
}

// Runs an async_ftp interaction on a client-side runtime; the server has its
// own worker pool.
fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

// A synchronous raw-protocol client.
struct Dialogue {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl Dialogue {
    fn connect(addr: &str) -> Dialogue {
        let stream = TcpStream::connect(addr).unwrap();
        stream.set_read_timeout(Some(IO_TIMEOUT)).unwrap();
        let reader = BufReader::new(stream.try_clone().unwrap());
        let mut dialogue = Dialogue { stream, reader };
        let greeting = dialogue.read_reply();
        assert!(greeting.starts_with("220"), "unexpected greeting: {greeting}");
        dialogue
    }

    fn send(&mut self, line: &str) {
        write!(self.stream, "{}\r\n", line).unwrap();
    }

    // Reads one complete (possibly multi-line) reply.
    fn read_reply(&mut self) -> String {
        let mut first = String::new();
        assert!(self.reader.read_line(&mut first).unwrap() > 0, "connection closed");
        let mut full = first.clone();
        if first.len() >= 4 && &first[3..4] == "-" {
            let code = first[..3].to_string();
            loop {
                let mut line = String::new();
                assert!(self.reader.read_line(&mut line).unwrap() > 0, "connection closed mid-reply");
                full.push_str(&line);
                if line.len() >= 4 && line.starts_with(&code) && &line[3..4] == " " {
                    break;
                }
            }
        }
        full
    }

    fn cmd(&mut self, line: &str) -> String {
        self.send(line);
        self.read_reply()
    }

    fn expect(&mut self, line: &str, code: &str) -> String {
        let reply = self.cmd(line);
        assert!(reply.starts_with(code), "{line:?} expected {code}, got: {reply}");
        reply
    }

    fn login(&mut self, username: &str, password: &str) {
        self.expect(&format!("USER {}", username), "331");
        self.expect(&format!("PASS {}", password), "230");
    }

    // Issues PASV and connects to the advertised endpoint.
    fn pasv_data(&mut self) -> TcpStream {
        let reply = self.expect("PASV", "227");
        let open = reply.find('(').unwrap();
        let close = reply.find(')').unwrap();
        let numbers: Vec<u16> = reply[open + 1..close].split(',').map(|n| n.trim().parse().unwrap()).collect();
        assert_eq!(numbers.len(), 6, "bad 227 reply: {reply}");
        let addr = format!(
            "{}.{}.{}.{}:{}",
            numbers[0],
            numbers[1],
            numbers[2],
            numbers[3],
            numbers[4] * 256 + numbers[5]
        );
        let data = TcpStream::connect(addr).unwrap();
        data.set_read_timeout(Some(IO_TIMEOUT)).unwrap();
        data
    }
}

fn wait_until<F: Fn() -> bool>(what: &str, condition: F) {
    let deadline = Instant::now() + IO_TIMEOUT;
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[rstest]
fn login_dialogue(harness: Harness) {
    let mut client = Dialogue::connect(&harness.addr);
    client.expect("USER hoi", "331");
    client.expect("PASS jij", "230");
    client.expect("PWD", "257");
}

#[rstest]
fn wrong_password_returns_to_start(harness: Harness) {
    let mut client = Dialogue::connect(&harness.addr);
    client.expect("USER hoi", "331");
    client.expect("PASS wrong", "530");
    // The candidate is gone; PASS alone is now out of sequence.
    client.expect("PASS jij", "503");
    client.login("hoi", "jij");
}

#[rstest]
fn commands_require_login(harness: Harness) {
    let mut client = Dialogue::connect(&harness.addr);
    for denied in ["PWD", "CWD /", "LIST", "DELE a.txt", "PASV", "RETR x", "SIZE x", "REIN", "SYST"] {
        client.expect(denied, "530");
    }
    // The pre-login allowance.
    client.expect("NOOP", "200");
    client.expect("HELP", "214");
    client.expect("FEAT", "211");
    client.expect("ACCT x", "202");
}

// The anonymous account lists a public root over PASV.
#[test]
fn anonymous_list() {
    let harness = harness_with(|server, root| {
        std::fs::write(root.join("hello.txt"), b"hi").unwrap();
        assert!(server.add_anonymous(root, Permissions::DIR_LIST | Permissions::FILE_READ));
    });
    let mut client = Dialogue::connect(&harness.addr);
    client.expect("USER anonymous", "331");
    client.expect("PASS x@y", "230");
    let pwd = client.expect("PWD", "257");
    assert!(pwd.contains("\"/\""), "unexpected PWD reply: {pwd}");
    client.expect("TYPE I", "200");

    let mut data = client.pasv_data();
    client.expect("LIST", "150");
    let mut listing = String::new();
    data.read_to_string(&mut listing).unwrap();
    let closing = client.read_reply();
    assert!(closing.starts_with("226"), "unexpected closing reply: {closing}");
    assert!(listing.contains("hello.txt"), "listing was: {listing}");
}

// A binary round-trip of one mebibyte survives unchanged.
#[rstest]
fn upload_download_roundtrip(harness: Harness) {
    use async_ftp::types::FileType;
    use std::io::Cursor;

    let payload: Vec<u8> = (0..1_048_576u32).map(|i| (i.wrapping_mul(7).wrapping_add(13)) as u8).collect();

    let downloaded = block_on(async {
        let mut ftp = async_ftp::FtpStream::connect(&harness.addr).await.unwrap();
        ftp.login("hoi", "jij").await.unwrap();
        ftp.transfer_type(FileType::Binary).await.unwrap();
        ftp.put("file.bin", &mut Cursor::new(payload.clone())).await.unwrap();
        ftp.simple_retr("file.bin").await.unwrap().into_inner()
    });

    assert_eq!(downloaded.len(), payload.len());
    assert!(downloaded == payload, "downloaded bytes differ from uploaded bytes");
}

// FileRead alone does not allow DELE.
#[test]
fn permission_denied_on_delete() {
    let harness = harness_with(|server, root| {
        std::fs::write(root.join("a.txt"), b"payload").unwrap();
        assert!(server.add_user("ro", "ro", root, Permissions::FILE_READ | Permissions::DIR_LIST));
    });
    let mut client = Dialogue::connect(&harness.addr);
    client.login("ro", "ro");
    client.expect("DELE /a.txt", "550");
}

// An intervening command breaks the RNFR/RNTO pair.
#[rstest]
fn rename_sequence(harness: Harness) {
    std::fs::write(harness.root.join("a.txt"), b"seven b").unwrap();
    let mut client = Dialogue::connect(&harness.addr);
    client.login("hoi", "jij");

    client.expect("RNFR /a.txt", "350");
    client.expect("NOOP", "200");
    client.expect("RNTO /b.txt", "503");

    client.expect("RNFR /a.txt", "350");
    client.expect("RNTO /b.txt", "250");

    client.expect("TYPE I", "200");
    let reply = client.expect("SIZE /b.txt", "213");
    assert_eq!(reply.trim(), "213 7");
    assert!(harness.root.join("b.txt").exists());
    assert!(!harness.root.join("a.txt").exists());
}

// Escapes clamp to the virtual root instead of failing.
#[rstest]
fn escape_attempt_is_clamped(harness: Harness) {
    std::fs::write(harness.root.join("inside.txt"), b"x").unwrap();
    let mut client = Dialogue::connect(&harness.addr);
    client.login("hoi", "jij");

    client.expect("CWD /../../etc", "250");
    let pwd = client.expect("PWD", "257");
    assert!(pwd.contains("\"/\""), "escape was not clamped to the root: {pwd}");

    // The working directory is the user's root, whose marker file shows up.
    let mut data = client.pasv_data();
    client.expect("LIST", "150");
    let mut listing = String::new();
    data.read_to_string(&mut listing).unwrap();
    let closing = client.read_reply();
    assert!(closing.starts_with("226"), "unexpected closing reply: {closing}");
    assert!(listing.contains("inside.txt"), "listing was: {listing}");
}

// ABOR mid-RETR yields 426 then 226 and the session lives on.
#[rstest]
fn abort_mid_transfer(harness: Harness) {
    // Big enough that socket buffers cannot swallow it while we sit on the
    // receiving end without reading.
    let chunk = vec![0xA5u8; 1 << 20];
    {
        let mut file = std::fs::File::create(harness.root.join("big.bin")).unwrap();
        for _ in 0..64 {
            file.write_all(&chunk).unwrap();
        }
    }

    let mut client = Dialogue::connect(&harness.addr);
    client.login("hoi", "jij");
    client.expect("TYPE I", "200");

    let mut data = client.pasv_data();
    client.expect("RETR /big.bin", "150");
    // Take a sip, then stop reading so the server backs up on the socket.
    let mut sip = [0u8; 1024];
    data.read_exact(&mut sip).unwrap();
    std::thread::sleep(Duration::from_millis(50));

    client.send("ABOR");
    let first = client.read_reply();
    assert!(first.starts_with("426"), "expected 426 first, got: {first}");
    let second = client.read_reply();
    assert!(second.starts_with("226"), "expected 226 second, got: {second}");
    drop(data);

    client.expect("NOOP", "200");
}

// REST + STOR resumes an upload at the given offset.
#[rstest]
fn rest_stor_resumes(harness: Harness) {
    let first: Vec<u8> = (0..1024u32).map(|i| i as u8).collect();
    let second: Vec<u8> = (0..1024u32).map(|i| (255 - i as u8)).collect();

    let mut client = Dialogue::connect(&harness.addr);
    client.login("hoi", "jij");
    client.expect("TYPE I", "200");

    let mut data = client.pasv_data();
    client.expect("STOR /x", "150");
    data.write_all(&first).unwrap();
    drop(data);
    let closing = client.read_reply();
    assert!(closing.starts_with("226"), "unexpected closing reply: {closing}");

    client.expect("REST 1024", "350");
    let mut data = client.pasv_data();
    client.expect("STOR /x", "150");
    data.write_all(&second).unwrap();
    drop(data);
    let closing = client.read_reply();
    assert!(closing.starts_with("226"), "unexpected closing reply: {closing}");

    wait_until("final file size", || {
        std::fs::metadata(harness.root.join("x")).map(|m| m.len() == 2048).unwrap_or(false)
    });
    let content = std::fs::read(harness.root.join("x")).unwrap();
    assert_eq!(&content[..1024], &first[..]);
    assert_eq!(&content[1024..], &second[..]);
}

// CWD normalizes its argument and is idempotent.
#[rstest]
fn cwd_normalization(harness: Harness) {
    std::fs::create_dir_all(harness.root.join("a/b")).unwrap();
    std::fs::create_dir_all(harness.root.join("a/c")).unwrap();

    let mut client = Dialogue::connect(&harness.addr);
    client.login("hoi", "jij");

    client.expect("CWD /a/b/../c/./", "250");
    let pwd = client.expect("PWD", "257");
    assert!(pwd.contains("\"/a/c\""), "expected /a/c, got: {pwd}");

    // Idempotence: the same absolute CWD from anywhere lands in the same place.
    client.expect("CWD /a/c", "250");
    let pwd = client.expect("PWD", "257");
    assert!(pwd.contains("\"/a/c\""), "expected /a/c, got: {pwd}");

    client.expect("CDUP", "250");
    let pwd = client.expect("PWD", "257");
    assert!(pwd.contains("\"/a\""), "expected /a, got: {pwd}");
}

#[rstest]
fn mkd_rmd_and_nonempty_rmd(harness: Harness) {
    block_on(async {
        let mut ftp = async_ftp::FtpStream::connect(&harness.addr).await.unwrap();
        ftp.login("hoi", "jij").await.unwrap();

        ftp.mkdir("fresh").await.unwrap();
        assert!(harness.root.join("fresh").is_dir());

        ftp.mkdir("busy").await.unwrap();
        std::fs::write(harness.root.join("busy/keep.txt"), b"x").unwrap();
        let err = ftp.rmdir("busy").await.unwrap_err().to_string();
        assert!(err.contains("550"), "expected 550 for non-empty RMD, got: {err}");

        ftp.rmdir("fresh").await.unwrap();
        assert!(!harness.root.join("fresh").exists());
    });
}

#[cfg(unix)]
#[rstest]
fn list_format(harness: Harness) {
    use std::os::unix::fs::{MetadataExt, OpenOptionsExt};

    let path = harness.root.join("test.txt");
    let file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o754)
        .open(&path)
        .unwrap();
    file.set_len(42).unwrap();
    let md = std::fs::metadata(&path).unwrap();
    let (uid, gid) = (md.uid(), md.gid());

    let list = block_on(async {
        let mut ftp = async_ftp::FtpStream::connect(&harness.addr).await.unwrap();
        ftp.login("hoi", "jij").await.unwrap();
        ftp.list(None).await.unwrap()
    });

    let pattern = format!(r"^-rwxr-xr--\s+1\s+{uid}\s+{gid}\s+42 [A-Z][a-z]{{2}} \d{{2}} \d{{2}}:\d{{2}} test\.txt$");
    let re = regex::Regex::new(&pattern).unwrap();
    let entry = list.iter().find(|entry| entry.contains("test.txt")).expect("entry not found");
    assert!(re.is_match(entry), "{entry:?} did not match {re:?}");
}

#[rstest]
fn nlst_lists_bare_names(harness: Harness) {
    std::fs::write(harness.root.join("one.txt"), b"1").unwrap();
    std::fs::write(harness.root.join("two.txt"), b"2").unwrap();

    let names = block_on(async {
        let mut ftp = async_ftp::FtpStream::connect(&harness.addr).await.unwrap();
        ftp.login("hoi", "jij").await.unwrap();
        ftp.nlst(None).await.unwrap()
    });

    assert!(names.iter().any(|n| n == "one.txt"), "names were: {names:?}");
    assert!(names.iter().any(|n| n == "two.txt"), "names were: {names:?}");
}

#[rstest]
fn size_requires_binary_type(harness: Harness) {
    std::fs::write(harness.root.join("f.bin"), b"12345").unwrap();
    let mut client = Dialogue::connect(&harness.addr);
    client.login("hoi", "jij");

    // The session starts in ASCII type per RFC 959.
    client.expect("SIZE /f.bin", "504");
    client.expect("TYPE A", "200");
    client.expect("SIZE /f.bin", "504");
    client.expect("TYPE I", "200");
    let reply = client.expect("SIZE /f.bin", "213");
    assert_eq!(reply.trim(), "213 5");
    client.expect("SIZE /missing", "550");
}

#[rstest]
fn reply_codes_for_unsupported_input(harness: Harness) {
    let mut client = Dialogue::connect(&harness.addr);
    client.login("hoi", "jij");

    client.expect("FOOBAR", "500");
    client.expect("TYPE X", "504");
    client.expect("STRU R", "504");
    client.expect("MODE B", "504");
    client.expect("OPTS UTF8 ON", "501");
    client.expect("REST not-a-number", "501");
    client.expect("SITE CHMOD 777 x", "502");
    client.expect("STAT", "502");
    client.expect("SYST", "215");
    client.expect("ALLO 1024", "202");
}

#[rstest]
fn feat_advertises_size_and_rest(harness: Harness) {
    let mut client = Dialogue::connect(&harness.addr);
    let reply = client.expect("FEAT", "211");
    assert!(reply.contains("SIZE"), "FEAT was: {reply}");
    assert!(reply.contains("REST STREAM"), "FEAT was: {reply}");
    assert!(reply.trim_end().ends_with("211 End"), "FEAT was: {reply}");
}

#[rstest]
fn stou_picks_a_fresh_name(harness: Harness) {
    let mut client = Dialogue::connect(&harness.addr);
    client.login("hoi", "jij");
    client.expect("TYPE I", "200");

    let mut data = client.pasv_data();
    let reply = client.expect("STOU", "150");
    let name = reply.trim().rsplit(' ').next().unwrap().to_string();
    assert!(reply.contains("FILE:"), "STOU reply was: {reply}");
    data.write_all(b"unique").unwrap();
    drop(data);
    let closing = client.read_reply();
    assert!(closing.starts_with("226"), "unexpected closing reply: {closing}");

    wait_until("stored unique file", || harness.root.join(&name).exists());
    assert_eq!(std::fs::read(harness.root.join(&name)).unwrap(), b"unique");
}

#[rstest]
fn appe_appends(harness: Harness) {
    let mut client = Dialogue::connect(&harness.addr);
    client.login("hoi", "jij");

    let mut data = client.pasv_data();
    client.expect("STOR /log", "150");
    data.write_all(b"one").unwrap();
    drop(data);
    assert!(client.read_reply().starts_with("226"));

    let mut data = client.pasv_data();
    client.expect("APPE /log", "150");
    data.write_all(b"two").unwrap();
    drop(data);
    assert!(client.read_reply().starts_with("226"));

    wait_until("appended file", || {
        std::fs::read(harness.root.join("log")).map(|c| c == b"onetwo").unwrap_or(false)
    });
}

#[rstest]
fn active_mode_via_port(harness: Harness) {
    std::fs::write(harness.root.join("seen.txt"), b"x").unwrap();
    let mut client = Dialogue::connect(&harness.addr);
    client.login("hoi", "jij");

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    client.expect(&format!("PORT 127,0,0,1,{},{}", port >> 8, port & 0xff), "200");

    client.expect("LIST", "150");
    let (mut data, _peer) = listener.accept().unwrap();
    data.set_read_timeout(Some(IO_TIMEOUT)).unwrap();
    let mut listing = String::new();
    data.read_to_string(&mut listing).unwrap();
    assert!(client.read_reply().starts_with("226"));
    assert!(listing.contains("seen.txt"), "listing was: {listing}");
}

#[rstest]
fn rein_logs_out(harness: Harness) {
    let mut client = Dialogue::connect(&harness.addr);
    client.login("hoi", "jij");
    client.expect("REIN", "220");
    client.expect("PWD", "530");
    client.login("hoi", "jij");
}

#[rstest]
fn quit_closes_the_connection(harness: Harness) {
    let mut client = Dialogue::connect(&harness.addr);
    client.expect("QUIT", "221");
    let mut line = String::new();
    assert_eq!(client.reader.read_line(&mut line).unwrap(), 0, "expected EOF after QUIT");
}

#[test]
fn idle_session_times_out() {
    let harness = harness_with(|server, root| {
        server.idle_session_timeout(1);
        assert!(server.add_user("hoi", "jij", root, Permissions::ALL));
    });
    let mut client = Dialogue::connect(&harness.addr);
    let reply = client.read_reply();
    assert!(reply.starts_with("421"), "expected 421 on idle expiry, got: {reply}");
}

#[rstest]
fn connection_count_tracks_sessions(harness: Harness) {
    assert_eq!(harness.server.open_connection_count(), 0);
    let one = Dialogue::connect(&harness.addr);
    let two = Dialogue::connect(&harness.addr);
    wait_until("two open connections", || harness.server.open_connection_count() == 2);
    drop(one);
    drop(two);
    wait_until("all connections closed", || harness.server.open_connection_count() == 0);
}

#[test]
fn command_callback_observes_dialogue() {
    let seen: Arc<Mutex<Vec<(String, String, u32, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let harness = harness_with(move |server, root| {
        assert!(server.add_user("hoi", "jij", root, Permissions::ALL));
        server.set_command_callback(move |command, param, code, text| {
            sink.lock().unwrap().push((command.to_string(), param.to_string(), code, text.to_string()));
        });
    });

    let mut client = Dialogue::connect(&harness.addr);
    client.expect("USER hoi", "331");
    client.expect("PASS jij", "230");
    client.expect("NOOP", "200");
    client.expect("QUIT", "221");

    wait_until("four observed commands", || seen.lock().unwrap().len() >= 4);
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].0, "USER");
    assert_eq!(seen[0].1, "hoi");
    assert_eq!(seen[0].2, 331);
    assert_eq!(seen[1].0, "PASS");
    assert_eq!(seen[1].2, 230);
    assert_eq!((seen[2].0.as_str(), seen[2].2), ("NOOP", 200));
    assert_eq!((seen[3].0.as_str(), seen[3].2), ("QUIT", 221));
}

#[test]
fn start_and_stop_lifecycle() {
    let tempdir = tempfile::TempDir::new().unwrap();
    let mut server = Server::new("127.0.0.1", 0);
    assert!(server.add_user("hoi", "jij", tempdir.path(), Permissions::ALL));

    assert!(!server.start(0), "zero worker threads must be rejected");
    assert!(server.start(1));
    let port = server.port();
    assert!(port > 0, "an OS-assigned port must be reported after start");
    assert!(!server.start(1), "double start must fail");
    assert_eq!(server.address(), "127.0.0.1");

    // Users cannot be added while running.
    assert!(!server.add_user("late", "pw", tempdir.path(), Permissions::ALL));

    let client = Dialogue::connect(&format!("127.0.0.1:{}", port));
    server.stop();
    drop(client);

    // A stopped server can be started again.
    let mut server2 = Server::new("127.0.0.1", 0);
    assert!(server2.add_user("hoi", "jij", tempdir.path(), Permissions::ALL));
    assert!(server2.start(1));
    Dialogue::connect(&format!("127.0.0.1:{}", server2.port()));
    server2.stop();
}

#[test]
fn duplicate_users_and_bad_roots_are_rejected() {
    let tempdir = tempfile::TempDir::new().unwrap();
    let mut server = Server::new("127.0.0.1", 0);
    assert!(server.add_user("a", "pw", tempdir.path(), Permissions::ALL));
    assert!(!server.add_user("a", "other", tempdir.path(), Permissions::ALL));
    assert!(!server.add_user("b", "pw", tempdir.path().join("missing"), Permissions::ALL));
    assert!(server.add_anonymous(tempdir.path(), Permissions::DIR_LIST));
    assert!(!server.add_user("ftp", "pw", tempdir.path(), Permissions::ALL));
}
