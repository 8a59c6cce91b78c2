//! Machine identity collection for file-key derivation.
//!
//! The seed is hostname, user, home directory and an OS machine id,
//! concatenated in that order. Every piece is best-effort: anything that
//! cannot be read contributes an empty string, so collection never fails.
//!
//! The derived key is tied to this machine. Moving the secrets file to
//! another host, or running where these identifiers change between runs
//! (ephemeral CI runners, rebuilt containers), leaves the file undecryptable.

use std::path::{Path, PathBuf};

use courier_core::env::{self, vars};
use courier_core::paths;
use tracing::debug;

/// Per-OS machine id lookup.
type MachineIdFn = fn() -> String;

/// Machine id strategies keyed by `std::env::consts::OS`.
const MACHINE_ID_STRATEGIES: &[(&str, MachineIdFn)] = &[
    ("linux", posix_machine_id),
    ("macos", darwin_machine_id),
    ("windows", windows_machine_id),
];

const SYSTEMD_MACHINE_ID: &str = "/etc/machine-id";
const DBUS_MACHINE_ID: &str = "/var/lib/dbus/machine-id";
const DARWIN_SYSTEM_KEY: &str = "/var/db/SystemKey";

/// Location of the machine GUID below `%LOCALAPPDATA%`.
const WINDOWS_GUID_COMPONENTS: &[&str] = &["Microsoft", "Windows", "MachineGuid"];

/// Build the identity seed for this machine.
pub fn collect_identity_seed() -> Vec<u8> {
    let parts = [hostname(), username(), home_dir(), machine_id()];
    debug!(
        has_hostname = !parts[0].is_empty(),
        has_user = !parts[1].is_empty(),
        has_home = !parts[2].is_empty(),
        has_machine_id = !parts[3].is_empty(),
        "collected machine identity"
    );
    parts.concat().into_bytes()
}

fn hostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Effective user, checking the POSIX variable before the Windows one.
fn username() -> String {
    env::get_var(vars::USER)
        .or_else(|| env::get_var(vars::USERNAME))
        .unwrap_or_default()
}

fn home_dir() -> String {
    dirs::home_dir()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Look up the strategy for the running OS.
///
/// Unix flavours without their own entry (the BSDs) share the POSIX chain.
pub fn machine_id() -> String {
    machine_id_strategy(std::env::consts::OS)
        .map(|strategy| strategy())
        .unwrap_or_default()
}

fn machine_id_strategy(os: &str) -> Option<MachineIdFn> {
    MACHINE_ID_STRATEGIES
        .iter()
        .find(|(name, _)| *name == os)
        .map(|(_, f)| *f)
        .or_else(|| cfg!(unix).then_some(posix_machine_id as MachineIdFn))
}

fn posix_machine_id() -> String {
    read_first_available(&[Path::new(SYSTEMD_MACHINE_ID), Path::new(DBUS_MACHINE_ID)])
}

fn darwin_machine_id() -> String {
    read_first_available(&[Path::new(DARWIN_SYSTEM_KEY)])
}

fn windows_machine_id() -> String {
    let from_appdata = env::get_var("LOCALAPPDATA").and_then(|base| {
        let base = PathBuf::from(base);
        let relative: PathBuf = WINDOWS_GUID_COMPONENTS.iter().collect();
        read_within(&base, &relative)
    });

    from_appdata
        .or_else(|| env::get_var("SystemRoot"))
        .unwrap_or_default()
}

/// Return the trimmed contents of the first readable, non-empty file.
fn read_first_available(candidates: &[&Path]) -> String {
    candidates
        .iter()
        .filter_map(|path| std::fs::read_to_string(path).ok())
        .map(|content| content.trim().to_string())
        .find(|content| !content.is_empty())
        .unwrap_or_default()
}

/// Read `base/relative`, refusing paths that resolve outside `base`.
fn read_within(base: &Path, relative: &Path) -> Option<String> {
    let candidate = base.join(relative);
    if !paths::is_within(&candidate, base) {
        debug!(path = %candidate.display(), "machine id path outside base directory; skipping");
        return None;
    }
    let content = std::fs::read_to_string(&candidate).ok()?;
    let trimmed = content.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
