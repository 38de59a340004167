//! OpenSSH `known_hosts` rendering for cached hosts.

use crate::record::HostRecord;

/// Renders one `known_hosts` line per public key: the host name and its
/// aliases comma-separated, a space, then the key. Hosts without keys
/// produce no lines.
pub fn render_known_hosts<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a HostRecord>,
{
    let mut out = String::new();
    for record in records {
        let mut patterns = record.name.clone();
        for alias in &record.aliases {
            patterns.push(',');
            patterns.push_str(alias);
        }
        for key in record.public_keys() {
            out.push_str(&format!("{} {}\n", patterns, key.trim()));
        }
    }
    out
}
