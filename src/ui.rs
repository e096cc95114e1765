use crate::models::InsurerStatusView;

pub fn render_index(views: &[InsurerStatusView]) -> String {
    let overdue = views.iter().filter(|view| view.days_overdue > 0).count();
    let rows = if views.is_empty() {
        r#"<tr><td colspan="6" class="empty">Noch keine Versicherungen hinterlegt.</td></tr>"#
            .to_string()
    } else {
        views.iter().map(render_row).collect::<Vec<_>>().join("\n")
    };

    INDEX_HTML
        .replace("{{TOTAL}}", &views.len().to_string())
        .replace("{{OVERDUE}}", &overdue.to_string())
        .replace("{{ROWS}}", &rows)
}

pub fn render_error(message: &str) -> String {
    INDEX_HTML
        .replace("{{TOTAL}}", "–")
        .replace("{{OVERDUE}}", "–")
        .replace(
            "{{ROWS}}",
            &format!(
                r#"<tr><td colspan="6" class="empty error">Daten konnten nicht geladen werden: {}</td></tr>"#,
                escape_html(message)
            ),
        )
}

fn render_row(view: &InsurerStatusView) -> String {
    let name = escape_html(&view.name);
    let due = view
        .due_date
        .as_deref()
        .map(|due| format!(r#"<span class="due">fällig {}</span>"#, escape_html(due)))
        .unwrap_or_default();
    format!(
        r#"<tr class="row {color}">
  <td><span class="dot"></span>{name}</td>
  <td>{label}</td>
  <td>{last_invoice}{due}</td>
  <td>{turnus}</td>
  <td class="instructions">{instructions}</td>
  <td>
    <form class="invoice-form" data-insurer="{name}">
      <input name="date" placeholder="TT.MM.JJJJ" pattern="\d{{2}}\.\d{{2}}\.\s?\d{{4}}.*" required />
      <button type="submit">Speichern</button>
    </form>
  </td>
</tr>"#,
        color = view.color,
        label = escape_html(&view.label),
        last_invoice = escape_html(&view.last_invoice),
        turnus = escape_html(&view.turnus),
        instructions = escape_html(&view.instructions),
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="de">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Abrechnungen</title>
  <style>
    :root {
      --ink: #2b2a28;
      --muted: #6f6a65;
      --card: #ffffff;
      --green: #2d7a4b;
      --yellow: #c99a06;
      --red: #c63b2b;
      --gray: #9a948d;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: #f5f2ec;
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      max-width: 1100px;
      margin: 0 auto;
      background: var(--card);
      border-radius: 20px;
      box-shadow: 0 24px 60px rgba(47, 72, 88, 0.12);
      padding: 32px;
      display: grid;
      gap: 24px;
    }

    h1 {
      margin: 0;
      font-family: "Georgia", serif;
    }

    .summary {
      margin: 6px 0 0;
      color: var(--muted);
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th, td {
      text-align: left;
      padding: 10px 8px;
      border-bottom: 1px solid rgba(47, 72, 88, 0.08);
      vertical-align: top;
    }

    th {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .dot {
      display: inline-block;
      width: 10px;
      height: 10px;
      border-radius: 50%;
      margin-right: 8px;
      background: var(--gray);
    }

    .row.green .dot { background: var(--green); }
    .row.yellow .dot { background: var(--yellow); }
    .row.red .dot { background: var(--red); }
    .row.red td:nth-child(2) { color: var(--red); font-weight: 600; }
    .row.yellow td:nth-child(2) { color: var(--yellow); font-weight: 600; }

    .due {
      display: block;
      font-size: 0.8rem;
      color: var(--muted);
    }

    .instructions {
      max-width: 280px;
      color: var(--muted);
      font-size: 0.9rem;
    }

    .invoice-form {
      display: flex;
      gap: 6px;
    }

    .invoice-form input {
      width: 120px;
      padding: 6px 8px;
    }

    .empty {
      text-align: center;
      color: var(--muted);
    }

    .error, .status[data-type="error"] {
      color: var(--red);
    }

    .status {
      min-height: 1.2em;
      color: var(--muted);
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Abrechnungen</h1>
      <p class="summary">{{TOTAL}} Versicherungen, davon {{OVERDUE}} überfällig</p>
    </header>

    <table>
      <thead>
        <tr>
          <th>Versicherung</th>
          <th>Status</th>
          <th>Letzte Abrechnung</th>
          <th>Turnus</th>
          <th>Anweisungen</th>
          <th>Neue Abrechnung</th>
        </tr>
      </thead>
      <tbody>
{{ROWS}}
      </tbody>
    </table>

    <div id="status" class="status" role="status"></div>
  </main>

  <script>
    const statusEl = document.getElementById('status');

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type;
    };

    const saveInvoice = async (insurerName, lastInvoiceDate) => {
      const res = await fetch('/insurers/invoice', {
        method: 'PUT',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ insurerName, lastInvoiceDate })
      });
      if (!res.ok) {
        const body = await res.json().catch(() => ({}));
        throw new Error(body.error || 'Speichern fehlgeschlagen');
      }
    };

    document.querySelectorAll('.invoice-form').forEach((form) => {
      form.addEventListener('submit', (event) => {
        event.preventDefault();
        const date = form.elements.date.value.trim();
        setStatus('Speichern...', 'info');
        saveInvoice(form.dataset.insurer, date)
          .then(() => window.location.reload())
          .catch((err) => setStatus(err.message, 'error'));
      });
    });
  </script>
</body>
</html>
"#;
