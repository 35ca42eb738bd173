// src/server/client.rs

use crate::server::LIVE_PATH;

const CLIENT_JS: &str = r#"(function () {
  var notify = __NOTIFY__;
  var source = new EventSource("__LIVE_PATH__");
  function banner(text) {
    if (!notify || !document.body) return;
    var el = document.createElement("div");
    el.textContent = text;
    el.style.cssText = "position:fixed;top:0;right:0;z-index:2147483647;padding:8px 14px;" +
      "background:#1b2b34;color:#fff;font:13px sans-serif;border-bottom-left-radius:4px";
    document.body.appendChild(el);
    setTimeout(function () { el.remove(); }, 1500);
  }
  source.addEventListener("reload", function () {
    location.reload();
  });
  source.addEventListener("css", function (e) {
    var target = e.data;
    var wanted = target.split("?")[0];
    var swapped = false;
    document.querySelectorAll('link[rel="stylesheet"]').forEach(function (link) {
      var href = (link.getAttribute("href") || "").split("?")[0].replace(/^\.?\//, "");
      if (href === wanted) {
        link.setAttribute("href", "/" + target);
        swapped = true;
      }
    });
    if (!swapped) {
      location.reload();
      return;
    }
    banner("Injected: " + wanted);
  });
})();"#;

/// Script block added to every served HTML page.
pub fn client_script(notify: bool) -> String {
    let js = CLIENT_JS
        .replace("__NOTIFY__", if notify { "true" } else { "false" })
        .replace("__LIVE_PATH__", LIVE_PATH);
    format!("<script data-sitepipe>{js}</script>")
}

/// Insert the live client before the last `</body>`, or append it when the
/// page has none.
pub fn inject_client(html: &str, notify: bool) -> String {
    let script = client_script(notify);
    match html.to_ascii_lowercase().rfind("</body>") {
        Some(idx) => {
            let mut out = String::with_capacity(html.len() + script.len());
            out.push_str(&html[..idx]);
            out.push_str(&script);
            out.push_str(&html[idx..]);
            out
        }
        None => format!("{html}{script}"),
    }
}
