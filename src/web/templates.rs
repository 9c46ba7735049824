//! HTML templates for the web interface.
//!
//! Embedded HTML templates for the dithering control UI.

use super::routes::Session;
use crate::config::Config;

/// Render the main control page
pub fn render_index_page(config: &Config, session: &Session, status_message: Option<&str>) -> String {
    let status_html = status_message
        .map(|msg| format!(r#"<div class="alert">{}</div>"#, html_escape(msg)))
        .unwrap_or_default();

    let source_info = session
        .source_name
        .as_deref()
        .map(html_escape)
        .unwrap_or_else(|| "none - drop an image below".to_string());

    let preview_html = if session.output_png.is_some() {
        r#"<img id="preview" src="/output.png" alt="Dithered preview">
           <div class="buttons">
               <a href="/output.png" download="dithered.png"><button type="button" class="btn-primary">Download PNG</button></a>
           </div>"#
            .to_string()
    } else {
        r#"<div class="help-text">No output yet. Drop an image or fetch one from a URL.</div>"#.to_string()
    };

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Ditherdrop</title>
    <style>
        * {{ box-sizing: border-box; }}
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background: #f5f5f5; }}
        .container {{ max-width: 800px; margin: 0 auto; background: white; padding: 24px; border-radius: 12px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }}
        h1 {{ color: #333; margin-top: 0; }}
        h3 {{ color: #444; margin-top: 24px; margin-bottom: 12px; }}
        .status {{ background: #e3f2fd; padding: 16px; border-radius: 8px; margin-bottom: 20px; font-size: 14px; word-break: break-word; }}
        .alert {{ background: #c8e6c9; padding: 12px; border-radius: 8px; margin-bottom: 16px; color: #2e7d32; }}
        label {{ display: block; margin-top: 16px; font-weight: 600; color: #555; }}
        input {{ width: 100%; padding: 10px; margin-top: 6px; border: 1px solid #ddd; border-radius: 8px; font-size: 15px; }}
        input:focus {{ outline: none; border-color: #2196F3; }}
        input[type="checkbox"] {{ width: auto; }}
        .checkbox-group {{ display: flex; gap: 20px; margin-top: 8px; flex-wrap: wrap; }}
        .checkbox-group label {{ display: flex; align-items: center; gap: 8px; font-weight: normal; margin-top: 0; }}
        .buttons {{ display: flex; gap: 10px; margin-top: 24px; flex-wrap: wrap; }}
        button {{ padding: 10px 20px; border: none; border-radius: 8px; font-size: 15px; cursor: pointer; font-weight: 600; }}
        .btn-primary {{ background: #4CAF50; color: white; }}
        .btn-blue {{ background: #2196F3; color: white; }}
        .btn-orange {{ background: #FF9800; color: white; }}
        .btn-red {{ background: #f44336; color: white; }}
        button:hover {{ opacity: 0.9; }}
        hr {{ border: none; border-top: 1px solid #eee; margin: 24px 0; }}
        .actions {{ display: flex; gap: 10px; flex-wrap: wrap; }}
        .actions a {{ text-decoration: none; }}
        .help-text {{ color: #666; font-size: 13px; margin-top: 4px; }}
        .row {{ display: flex; gap: 10px; }}
        .row input {{ flex: 1; }}
        #drop {{ margin-top: 16px; padding: 40px 20px; border: 2px dashed #bbb; border-radius: 12px; text-align: center; color: #888; cursor: pointer; }}
        #drop.over {{ border-color: #2196F3; color: #2196F3; background: #e3f2fd; }}
        #preview {{ max-width: 100%; image-rendering: pixelated; border: 1px solid #eee; border-radius: 8px; margin-top: 12px; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>Ditherdrop</h1>
        {status_html}
        <div class="status">
            <strong>Source:</strong> {source_info}<br>
            <strong>Scale:</strong> {scale_factor} &nbsp;|&nbsp; <strong>Grayscale:</strong> {grayscale_label}
        </div>

        <div id="drop">Drop an image here, or click to choose a file</div>
        <input type="file" id="file" accept="image/*" style="display:none">

        <form method="POST" action="/save" id="paramsForm">
            <label>Scale factor:</label>
            <input type="number" name="scale_factor" value="{scale_factor}" min="1" max="100">
            <div class="help-text">Coarseness of the dither pattern: the image is downscaled by this factor before dithering and block-replicated back up after.</div>

            <label>Options:</label>
            <div class="checkbox-group">
                <label><input type="checkbox" name="grayscale" {grayscale_checked}> Grayscale</label>
            </div>

            <label>Image URL (optional source):</label>
            <input type="text" name="image_url" value="{url}" placeholder="https://example.com/image.png">

            <label>Max source dimension:</label>
            <input type="number" name="max_dimension" value="{max_dimension}" min="100" max="4096">
            <div class="help-text">Larger sources are scaled down to this long-edge size before processing.</div>

            <div class="buttons">
                <button type="submit" class="btn-primary">Save</button>
                <button type="submit" formaction="/apply" class="btn-blue">Save &amp; Apply</button>
            </div>
        </form>
        <hr>
        <h3>Actions</h3>
        <div class="actions">
            <a href="/action/fetch"><button type="button" class="btn-orange">Fetch URL</button></a>
            <a href="/action/reprocess"><button type="button" class="btn-blue">Reprocess</button></a>
            <a href="/action/clear"><button type="button" class="btn-red">Clear</button></a>
        </div>

        <h3>Preview</h3>
        {preview_html}
    </div>
    <script>
    const drop = document.getElementById('drop');
    const file = document.getElementById('file');

    async function upload(blob) {{
        drop.textContent = 'Processing...';
        const res = await fetch('/image', {{ method: 'POST', body: blob }});
        if (res.ok) {{
            location.reload();
        }} else {{
            alert(await res.text());
            drop.textContent = 'Drop an image here, or click to choose a file';
        }}
    }}

    drop.addEventListener('click', () => file.click());
    file.addEventListener('change', () => {{
        if (file.files.length > 0) upload(file.files[0]);
    }});
    drop.addEventListener('dragover', e => {{ e.preventDefault(); drop.classList.add('over'); }});
    drop.addEventListener('dragleave', () => drop.classList.remove('over'));
    drop.addEventListener('drop', e => {{
        e.preventDefault();
        drop.classList.remove('over');
        if (e.dataTransfer.files.length > 0) upload(e.dataTransfer.files[0]);
    }});
    </script>
</body>
</html>"##,
        status_html = status_html,
        source_info = source_info,
        preview_html = preview_html,
        url = html_escape(&config.image_url),
        scale_factor = config.scale_factor,
        max_dimension = config.max_dimension,
        grayscale_checked = checked_if(config.grayscale),
        grayscale_label = if config.grayscale { "on" } else { "off" },
    )
}

/// Render a simple message page
pub fn render_message_page(title: &str, message: &str, back_link: bool) -> String {
    let back_html = if back_link {
        r#"<p><a href="/">← Back to controls</a></p>"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html><head><meta charset="UTF-8"><title>{title}</title>
<style>body{{font-family:sans-serif;padding:20px;}}
.msg{{background:#e3f2fd;padding:20px;border-radius:8px;max-width:500px;}}
a{{color:#2196F3;}}</style></head>
<body><div class="msg"><h2>{title}</h2><p>{message}</p>{back_html}</div></body></html>"#,
        title = html_escape(title),
        message = html_escape(message),
        back_html = back_html,
    )
}

fn checked_if(condition: bool) -> &'static str {
    if condition { "checked" } else { "" }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
