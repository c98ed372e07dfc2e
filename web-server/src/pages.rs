// web-server/src/pages.rs
use filedrop_common::models::counter::CounterSnapshot;
use html_escape::{encode_double_quoted_attribute, encode_text};

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        encode_text(title),
        body
    )
}

pub fn login_form() -> String {
    layout(
        "Login",
        r#"<h1>Login</h1>
<form method="post" action="/login">
  <label>User <input type="text" name="user" autocomplete="username"></label>
  <label>Password <input type="password" name="password" autocomplete="current-password"></label>
  <button type="submit">Log in</button>
</form>"#,
    )
}

// Browser side of the counter socket: one event per click, totals refreshed from the reply.
const COUNTER_SCRIPT: &str = r#"<script>
const proto = location.protocol === "https:" ? "wss:" : "ws:";
const socket = new WebSocket(proto + "//" + location.host + "/count");
socket.onmessage = (event) => {
  const reply = JSON.parse(event.data);
  const target = document.getElementById(reply.type === "preview" ? "total-previews" : "total-downloads");
  if (target) { target.textContent = reply.value; }
};
function sendCountUpdate(type) {
  if (socket.readyState === WebSocket.OPEN) { socket.send(JSON.stringify({ type })); }
}
</script>"#;

/// Directory listing with download/preview links and the current totals
pub fn file_list(files: &[String], counts: CounterSnapshot) -> String {
    let entries: Vec<String> = files
        .iter()
        .map(|name| {
            // one path segment: `?`, `#`, `%` and `/` must not leak into the URL structure
            let segment = urlencoding::encode(name);
            format!(
                "<li>{text} <a href=\"/files/{href}\" download=\"{attr}\">Download</a> \
                 <a href=\"/preview/{href}\" target=\"_blank\" onclick=\"sendCountUpdate('preview')\">Preview</a></li>",
                text = encode_text(name),
                href = encode_double_quoted_attribute(&segment),
                attr = encode_double_quoted_attribute(name),
            )
        })
        .collect();

    let body = format!(
        "<h1>Files</h1>\n<p>Total previews: <span id=\"total-previews\">{}</span> \
         Total downloads: <span id=\"total-downloads\">{}</span></p>\n<ul>\n{}\n</ul>\n\
         <p><a href=\"/upload/form\">Upload</a> <a href=\"/logout\">Log out</a></p>\n{}",
        counts.previews,
        counts.downloads,
        entries.join("\n"),
        COUNTER_SCRIPT
    );

    layout("Files", &body)
}

pub fn upload_form() -> String {
    layout(
        "Upload",
        r#"<h1>Upload a file</h1>
<form method="post" action="/upload" enctype="multipart/form-data">
  <input type="file" name="file">
  <button type="submit">Upload</button>
</form>
<p><a href="/files">Back to files</a></p>"#,
    )
}

pub fn not_found() -> String {
    layout(
        "404 Not Found",
        "<h1>404 Not Found</h1>\n<p>The page you are looking for might have been removed, \
         had its name changed, or is temporarily unavailable.</p>",
    )
}

pub fn internal_error() -> String {
    layout(
        "500 Internal Server Error",
        "<h1>500 Internal Server Error</h1>\n<p>Oops! Something went wrong on our end.</p>",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names_are_escaped() {
        let page = file_list(
            &["<script>.txt".to_string(), "a\"b.txt".to_string()],
            CounterSnapshot::default(),
        );
        assert!(page.contains("&lt;script&gt;.txt"));
        assert!(!page.contains("<li><script>"));
        assert!(page.contains("a&quot;b.txt"));
    }

    #[test]
    fn test_links_are_percent_encoded() {
        let page = file_list(
            &["q?.txt".to_string(), "50% off #2.txt".to_string()],
            CounterSnapshot::default(),
        );
        assert!(page.contains("href=\"/files/q%3F.txt\""));
        assert!(page.contains("href=\"/preview/q%3F.txt\""));
        assert!(page.contains("href=\"/files/50%25%20off%20%232.txt\""));
        // the visible name and the suggested download name stay readable
        assert!(page.contains("download=\"q?.txt\""));
        assert!(page.contains("<li>50% off #2.txt "));
    }

    #[test]
    fn test_counts_rendered() {
        let page = file_list(&[], CounterSnapshot { previews: 3, downloads: 5 });
        assert!(page.contains("<span id=\"total-previews\">3</span>"));
        assert!(page.contains("<span id=\"total-downloads\">5</span>"));
    }
}
