//! Index page - a minimal form for generating images from the browser.
//!
//! Generated images are displayed through `/proxy-image` so they can be drawn
//! onto a canvas or downloaded without cross-origin errors.

/// Static HTML served at `/`.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Image Relay</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            background: #0f0f0f;
            color: #e6e6e6;
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif;
            padding: 32px;
        }
        h1 { font-size: 20px; margin-bottom: 16px; }
        form { display: flex; gap: 8px; flex-wrap: wrap; margin-bottom: 24px; }
        input, select, button {
            background: #1c1c1c;
            color: inherit;
            border: 1px solid #333;
            border-radius: 6px;
            padding: 8px 12px;
            font-size: 14px;
        }
        #keywords { flex: 1; min-width: 240px; }
        button { cursor: pointer; }
        button:disabled { opacity: 0.5; cursor: wait; }
        #status { margin-bottom: 16px; min-height: 20px; color: #9a9a9a; }
        #status.error { color: #ff6b6b; }
        #gallery {
            display: grid;
            grid-template-columns: repeat(auto-fill, minmax(256px, 1fr));
            gap: 16px;
        }
        #gallery img { width: 100%; border-radius: 8px; background: #1c1c1c; }
    </style>
</head>
<body>
    <h1>Image Relay</h1>
    <form id="generate">
        <input id="keywords" placeholder="Keywords, separated by commas" autocomplete="off">
        <select id="size">
            <option>1024x1024</option>
            <option>1792x1024</option>
            <option>1024x1792</option>
        </select>
        <input id="count" type="number" min="1" max="10" value="1">
        <button type="submit">Generate</button>
    </form>
    <div id="status"></div>
    <div id="gallery"></div>
    <script>
        const form = document.getElementById('generate');
        const status = document.getElementById('status');
        const gallery = document.getElementById('gallery');

        function setStatus(text, isError) {
            status.textContent = text;
            status.className = isError ? 'error' : '';
        }

        form.addEventListener('submit', async (event) => {
            event.preventDefault();
            const button = form.querySelector('button');
            const keywords = document.getElementById('keywords').value
                .split(',')
                .map((k) => k.trim())
                .filter((k) => k.length > 0);

            button.disabled = true;
            setStatus('Generating...', false);
            try {
                const response = await fetch('/v1/generate_images', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({
                        keywords,
                        size: document.getElementById('size').value,
                        num_images: document.getElementById('count').value,
                    }),
                });
                const data = await response.json();
                if (!response.ok) {
                    setStatus(data.error || 'Request failed', true);
                    return;
                }
                for (const url of data.images) {
                    const img = document.createElement('img');
                    img.crossOrigin = 'anonymous';
                    img.src = '/proxy-image?url=' + encodeURIComponent(url);
                    gallery.prepend(img);
                }
                setStatus('', false);
            } catch (err) {
                setStatus(String(err), true);
            } finally {
                button.disabled = false;
            }
        });
    </script>
</body>
</html>
"##;
