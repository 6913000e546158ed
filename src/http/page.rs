//! Interactive HTML editor document.
//!
//! Pure presentation: the page carries no state beyond the embedded note id
//! and content, both HTML-escaped before templating. Autosave posts the JSON
//! body back through the same normalizer as every other caller.

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <link rel="icon" href="/favicon.ico" type="image/x-icon">
    <title>Note</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif;
            color: #1E293B;
            background: #FFFFFF;
        }
        .container { display: flex; flex-direction: column; height: 100vh; }
        .header {
            display: flex; justify-content: space-between; align-items: center;
            padding: 12px 20px; border-bottom: 1px solid #E2E8F0;
        }
        .header h1 { font-size: 20px; }
        .note-id {
            font-family: monospace; font-size: 12px; color: #94A3B8;
            background: #EFF6FF; padding: 2px 8px; border-radius: 4px;
        }
        .note-id:empty { display: none; }
        .btn {
            padding: 7px 14px; border: 1px solid #E2E8F0; background: #FFFFFF;
            border-radius: 6px; cursor: pointer; font-size: 13px;
        }
        .btn:hover { background: #EFF6FF; border-color: #2563EB; }
        .editor-wrap { flex: 1; display: flex; padding: 12px; }
        textarea {
            flex: 1; border: 1px solid #E2E8F0; border-radius: 8px; padding: 20px;
            font-family: monospace; font-size: 14px; line-height: 1.6;
            resize: none; background: #F8FAFC; outline: none;
        }
        .status-bar {
            padding: 8px 20px; border-top: 1px solid #E2E8F0;
            font-size: 12px; color: #64748B;
        }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>&#9998; Note <span class="note-id" id="noteInfo">__NOTE_ID__</span></h1>
            <button class="btn" onclick="window.location.href = appBase">New</button>
        </div>
        <div class="editor-wrap">
            <textarea id="content" placeholder="Start typing your note...">__CONTENT__</textarea>
        </div>
        <div class="status-bar"><span id="statusText">Ready</span></div>
    </div>
    <script>
        const basePath = window.location.pathname.replace(/\/noteid\/.*$/, '');
        const appBase = basePath.endsWith('/') ? basePath : basePath + '/';
        const textarea = document.getElementById('content');
        const statusText = document.getElementById('statusText');
        let currentNoteId = "__NOTE_ID__";
        let lastSaved = textarea.value;

        function autoSave() {
            if (textarea.value === lastSaved) return;
            statusText.textContent = 'Saving...';
            const saveUrl = currentNoteId ? appBase + 'noteid/' + currentNoteId : appBase;
            fetch(saveUrl, {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({ noteId: currentNoteId, content: textarea.value })
            })
            .then(function(response) {
                if (!response.ok) throw new Error('HTTP ' + response.status);
                return response.json();
            })
            .then(function(data) {
                if (!data.success) throw new Error(data.error || 'Save failed');
                lastSaved = textarea.value;
                currentNoteId = data.noteId;
                const newPath = appBase + 'noteid/' + data.noteId;
                if (currentNoteId && window.location.pathname !== newPath) {
                    window.history.replaceState({}, '', newPath);
                    document.getElementById('noteInfo').textContent = data.noteId;
                }
                statusText.textContent = 'Saved';
            })
            .catch(function(err) {
                statusText.textContent = 'Error: ' + err.message;
            });
        }

        setInterval(autoSave, 1000);
        textarea.focus();
    </script>
</body>
</html>"#;

/// Escapes HTML special characters for safe embedding in the document.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders the editor document with the note id and content embedded, escaped.
pub fn render(note_id: &str, content: &str) -> String {
    PAGE_TEMPLATE
        .replace("__NOTE_ID__", &escape_html(note_id))
        .replace("__CONTENT__", &escape_html(content))
}
