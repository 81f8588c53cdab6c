use crate::models::EmbedCode;
use crate::utils::embed_page::escape_html;

pub const CONTAINER_PREFIX: &str = "reviewhub-widget-";
pub const IFRAME_HEIGHT: u32 = 600;

fn base(public_url: &str) -> &str {
    public_url.trim_end_matches('/')
}

pub fn container_id(widget_id: &str) -> String {
    format!("{}{}", CONTAINER_PREFIX, widget_id)
}

pub fn loader_url(public_url: &str) -> String {
    format!("{}/widget.js", base(public_url))
}

pub fn embed_url(public_url: &str, widget_id: &str) -> String {
    format!("{}/embed/widget/{}", base(public_url), widget_id)
}

/// Container div plus a single loader script tag that mounts the widget once loaded.
pub fn script_snippet(public_url: &str, widget_id: &str) -> String {
    let container = escape_html(&container_id(widget_id));
    let widget_id = escape_html(widget_id);
    format!(
        "<div id=\"{container}\"></div>\n<script src=\"{loader}\" async onload=\"window.ReviewHub.initWidget({{containerId:'{container}',widgetId:'{widget_id}'}})\"></script>",
        container = container,
        loader = escape_html(&loader_url(public_url)),
        widget_id = widget_id,
    )
}

pub fn iframe_snippet(public_url: &str, widget_id: &str, widget_name: &str) -> String {
    format!(
        "<iframe src=\"{}\" title=\"{}\" width=\"100%\" height=\"{}\" style=\"border:none;\" loading=\"lazy\"></iframe>",
        escape_html(&embed_url(public_url, widget_id)),
        escape_html(widget_name),
        IFRAME_HEIGHT,
    )
}

pub fn embed_code(public_url: &str, widget_id: &str, widget_name: &str) -> EmbedCode {
    EmbedCode {
        script: script_snippet(public_url, widget_id),
        iframe: iframe_snippet(public_url, widget_id, widget_name),
    }
}

/// Body of `/widget.js`. Exposes `window.ReviewHub.initWidget` for host pages.
pub fn loader_script(public_url: &str) -> String {
    let embed_base = format!("{}/embed/widget/", base(public_url));
    format!(
        r#"(function () {{
  var BASE = {base};
  function initWidget(options) {{
    if (!options || !options.containerId || !options.widgetId) {{
      console.error("ReviewHub: containerId and widgetId are required");
      return null;
    }}
    var container = document.getElementById(options.containerId);
    if (!container) {{
      console.error("ReviewHub: container not found: " + options.containerId);
      return null;
    }}
    var frame = document.createElement("iframe");
    frame.src = BASE + encodeURIComponent(options.widgetId);
    frame.title = "ReviewHub reviews";
    frame.width = "100%";
    frame.height = "{height}";
    frame.style.border = "none";
    frame.setAttribute("loading", "lazy");
    container.innerHTML = "";
    container.appendChild(frame);
    return frame;
  }}
  window.ReviewHub = window.ReviewHub || {{}};
  window.ReviewHub.initWidget = initWidget;
}})();
"#,
        base = serde_json::Value::String(embed_base),
        height = IFRAME_HEIGHT,
    )
}
