//! Caddyfile text served from the ConfigMap.

/// Caddy serves the static bundle from `/usr/share/caddy` and forwards
/// `/api/*` to the upstream, rewriting `Host` and opening up CORS.
const CADDYFILE_TEMPLATE: &str = "\
:80 {
  root * /usr/share/caddy
  file_server
  reverse_proxy /api/* {{reverse_proxy}} {
      header_up Host {http.reverse_proxy.upstream.hostport}
      header_down Access-Control-Allow-Headers *
      header_down Access-Control-Allow-Origin *
  }
}
";

/// Renders the Caddyfile for the given upstream API address.
///
/// The address is interpolated as-is; Caddy rejects the file at load time
/// if it does not parse.
pub fn caddyfile(reverse_proxy: &str) -> String {
    CADDYFILE_TEMPLATE.replace("{{reverse_proxy}}", reverse_proxy)
}
