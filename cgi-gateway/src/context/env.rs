//! CGI environment variables.
//!
//! The host server passes request metadata through the process environment.
//! [`Environment::collect`] snapshots a fixed allow-list of variables once per
//! invocation; every listed name is present in the snapshot, with `""` standing
//! in for variables the server did not set.

use std::collections::BTreeMap;

/// Variables captured from the process environment.
pub const CGI_VARIABLES: [&str; 31] = [
    // Server
    "SERVER_SOFTWARE",
    "SERVER_NAME",
    "GATEWAY_INTERFACE",
    // Request
    "SERVER_PROTOCOL",
    "SERVER_PORT",
    "REQUEST_METHOD",
    "REQUEST_URI",
    "PATH_INFO",
    "PATH_TRANSLATED",
    "SCRIPT_NAME",
    "QUERY_STRING",
    "REMOTE_HOST",
    "REMOTE_ADDR",
    "AUTH_TYPE",
    "REMOTE_USER",
    "REMOTE_IDENT",
    "CONTENT_TYPE",
    "CONTENT_LENGTH",
    "DOCUMENT_ROOT",
    "HTTPS",
    // Client headers
    "HTTP_ACCEPT",
    "HTTP_ACCEPT_CHARSET",
    "HTTP_ACCEPT_ENCODING",
    "HTTP_ACCEPT_LANGUAGE",
    "HTTP_CONNECTION",
    "HTTP_COOKIE",
    "HTTP_FROM",
    "HTTP_HOST",
    "HTTP_IF_MODIFIED_SINCE",
    "HTTP_REFERER",
    "HTTP_USER_AGENT",
];

/// Immutable snapshot of the CGI variables for one invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<&'static str, String>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Environment {
    /// Snapshot the allow-listed variables from the process environment.
    ///
    /// Values that are not valid Unicode are converted lossily.
    pub fn collect() -> Self {
        Self::from_lookup(|name| {
            std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
        })
    }

    /// Build the table by asking `lookup` for each allow-listed name.
    pub fn from_lookup<F>(mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let vars = CGI_VARIABLES
            .iter()
            .map(|&name| (name, lookup(name).unwrap_or_default()))
            .collect();
        Self { vars }
    }

    /// Build the table from name/value pairs. Names outside the allow-list are
    /// ignored; when a name repeats, the last value wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut given: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in pairs {
            given.insert(name.as_ref().to_string(), value.into());
        }
        Self::from_lookup(|name| given.remove(name))
    }

    /// Value of an allow-listed variable (`""` when unset), or `None` for
    /// names that are not captured.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    fn get(&self, name: &str) -> &str {
        self.var(name).unwrap_or("")
    }

    /// All captured variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.vars.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn request_method(&self) -> &str {
        self.get("REQUEST_METHOD")
    }

    pub fn query_string(&self) -> &str {
        self.get("QUERY_STRING")
    }

    pub fn content_type(&self) -> &str {
        self.get("CONTENT_TYPE")
    }

    /// `CONTENT_LENGTH` as a byte count, `None` when absent or not a
    /// non-negative integer.
    pub fn content_length(&self) -> Option<usize> {
        let raw = self.get("CONTENT_LENGTH");
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        raw.parse().ok()
    }

    pub fn server_name(&self) -> &str {
        self.get("SERVER_NAME")
    }

    pub fn server_port(&self) -> Option<u16> {
        self.get("SERVER_PORT").trim().parse().ok()
    }

    pub fn server_software(&self) -> &str {
        self.get("SERVER_SOFTWARE")
    }

    pub fn path_info(&self) -> &str {
        self.get("PATH_INFO")
    }

    pub fn script_name(&self) -> &str {
        self.get("SCRIPT_NAME")
    }

    pub fn remote_addr(&self) -> &str {
        self.get("REMOTE_ADDR")
    }

    /// `REMOTE_HOST`, or `REMOTE_ADDR` when the server did not resolve a name.
    pub fn remote_host(&self) -> &str {
        match self.get("REMOTE_HOST") {
            "" => self.remote_addr(),
            host => host,
        }
    }

    pub fn remote_user(&self) -> &str {
        self.get("REMOTE_USER")
    }

    pub fn auth_type(&self) -> &str {
        self.get("AUTH_TYPE")
    }

    pub fn user_agent(&self) -> &str {
        self.get("HTTP_USER_AGENT")
    }

    /// A client request header by its HTTP name, e.g. `User-Agent` reads
    /// `HTTP_USER_AGENT`. Returns `None` for headers the server does not pass
    /// or that were left unset.
    pub fn request_header(&self, name: &str) -> Option<&str> {
        let var = format!("HTTP_{}", name.to_ascii_uppercase().replace('-', "_"));
        self.var(&var).filter(|value| !value.is_empty())
    }

    /// Whether the request arrived over TLS (`HTTPS` set to `on` or `1`).
    pub fn is_https(&self) -> bool {
        matches!(self.get("HTTPS").to_ascii_lowercase().as_str(), "on" | "1")
    }

    /// URI of the running program: `scheme://host[:port]/script`.
    ///
    /// The port is omitted when it is the scheme's default.
    pub fn prog_uri(&self) -> String {
        let (scheme, default_port) = if self.is_https() {
            ("https", 443)
        } else {
            ("http", 80)
        };
        match self.server_port() {
            Some(port) if port != default_port => {
                format!("{scheme}://{}:{port}{}", self.server_name(), self.script_name())
            }
            _ => format!("{scheme}://{}{}", self.server_name(), self.script_name()),
        }
    }

    /// [`prog_uri`](Self::prog_uri) plus `PATH_INFO` and, when non-empty, the
    /// query string.
    pub fn query_uri(&self) -> String {
        let mut uri = self.prog_uri();
        uri.push_str(self.path_info());
        if !self.query_string().is_empty() {
            uri.push('?');
            uri.push_str(self.query_string());
        }
        uri
    }

    /// `REQUEST_URI` as sent by the server, or the reconstructed
    /// [`query_uri`](Self::query_uri) when the server does not provide it.
    pub fn request_uri(&self) -> String {
        match self.get("REQUEST_URI") {
            "" => self.query_uri(),
            uri => uri.to_string(),
        }
    }
}
