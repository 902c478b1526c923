//! Embedded HTML page for picking the best question

pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Best Question Picker</title>
    <style>
        :root {
            --fg: #0f172a;
            --muted: #475569;
            --bg: #f8fafc;
            --primary: #2563eb;
            --ok: #16a34a;
            --err: #dc2626;
            --line: #e5e7eb;
            --mono: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace;
        }
        * { box-sizing: border-box; }
        body {
            margin: 0;
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg);
            color: var(--fg);
            font-size: 14px;
        }
        .wrap { max-width: 1200px; margin: 24px auto; padding: 0 16px; }
        h1 { font-size: 1.35rem; margin: 0 0 16px; }
        h3 { margin: 0 0 10px; font-size: 1rem; }

        /* Cards */
        .card {
            background: #fff;
            border: 1px solid var(--line);
            border-radius: 12px;
            box-shadow: 0 2px 10px rgba(2, 8, 23, .04);
            padding: 16px;
        }
        .grid { display: grid; grid-template-columns: 1fr; gap: 16px; margin-top: 16px; }
        @media (min-width: 1024px) { .grid { grid-template-columns: 1fr 1fr; } }

        /* Form */
        .row { display: flex; gap: 12px; flex-wrap: wrap; }
        .field { display: flex; flex-direction: column; gap: 6px; min-width: 220px; }
        .field.wide { flex: 1; min-width: 320px; }
        label { font-size: 12px; color: var(--muted); }
        input, select, textarea {
            border: 1px solid var(--line);
            border-radius: 8px;
            padding: 8px 10px;
            font-size: 14px;
            background: #fff;
        }
        textarea { min-height: 92px; width: 100%; }
        .options { display: flex; gap: 16px; align-items: center; padding-top: 8px; flex-wrap: wrap; }
        .options label { font-family: var(--mono); color: var(--fg); }

        /* Buttons */
        button {
            border: 1px solid var(--primary);
            background: var(--primary);
            color: #fff;
            padding: 8px 14px;
            border-radius: 8px;
            font-weight: 600;
            cursor: pointer;
        }
        button.secondary { background: #fff; color: var(--primary); }
        button.ghost { background: #fff; color: var(--fg); border-color: var(--line); }
        button:disabled { opacity: .6; cursor: not-allowed; }
        .actions { display: flex; gap: 10px; align-items: center; flex-wrap: wrap; margin-top: 12px; }
        .status { font-size: 12px; color: var(--muted); }
        .search { margin-left: auto; display: flex; gap: 8px; align-items: center; }

        /* Summary */
        .muted { color: var(--muted); }
        .error { color: var(--err); }
        .winner { border-left: 4px solid var(--ok); padding-left: 12px; margin-top: 10px; }
        .mono { font-family: var(--mono); }

        /* Table */
        .table-wrap { overflow: auto; max-height: 60vh; }
        table { width: 100%; border-collapse: collapse; }
        thead th { position: sticky; top: 0; background: #f1f5f9; z-index: 1; }
        th, td { text-align: left; padding: 8px 10px; border-bottom: 1px solid var(--line); vertical-align: top; }
        .nowrap { white-space: nowrap; }
        .pill {
            display: inline-block;
            padding: 2px 8px;
            border-radius: 999px;
            font-size: 12px;
            border: 1px solid #e2e8f0;
            background: #f8fafc;
        }
        .badge { display: inline-block; padding: 2px 8px; border-radius: 8px; border: 1px solid var(--line); font-size: 12px; }
        .scorebar { height: 6px; border-radius: 999px; background: #e2e8f0; position: relative; margin-top: 6px; }
        .scorebar > span { position: absolute; top: 0; left: 0; height: 100%; border-radius: 999px; }

        /* Collapsible cells */
        details.collapsible > summary {
            cursor: pointer;
            list-style: none;
            user-select: none;
            font-size: 12px;
            color: var(--muted);
            margin-bottom: 6px;
        }
        details.collapsible > summary::-webkit-details-marker { display: none; }
        .preview {
            font-size: 13px;
            line-height: 1.35;
            max-height: 3.2em;
            overflow: hidden;
            display: -webkit-box;
            -webkit-line-clamp: 2;
            -webkit-box-orient: vertical;
        }
        details.collapsible[open] .preview { display: none; }
        .full {
            border: 1px dashed var(--line);
            border-radius: 8px;
            padding: 8px;
            font-size: 13px;
            background: #f8fafc;
            max-height: 40vh;
            overflow: auto;
            white-space: pre-wrap;
            word-break: break-word;
            margin: 0;
        }

        /* Raw model output */
        .raw-actions { display: flex; gap: 8px; align-items: center; margin-bottom: 8px; }
        #raw {
            background: #0b1220;
            color: #e2e8f0;
            padding: 12px;
            border-radius: 8px;
            white-space: pre;
            word-break: normal;
            overflow: auto;
            max-height: 50vh;
            margin: 0;
        }
        #raw.wrapped { white-space: pre-wrap; word-break: break-word; }
    </style>
</head>
<body>
<div class="wrap">
    <h1>Best Question Picker</h1>

    <div class="card">
        <div class="row">
            <div class="field">
                <label for="tz">Time zone (IANA)</label>
                <input id="tz" type="text" value="Europe/Amsterdam">
            </div>
            <div class="field">
                <label for="start">Window start</label>
                <input id="start" type="datetime-local">
            </div>
            <div class="field">
                <label for="end">Window end</label>
                <input id="end" type="datetime-local">
            </div>
            <div class="field">
                <label for="limit">Candidate limit</label>
                <input id="limit" type="number" min="1" step="1" value="200">
            </div>
            <div class="field wide">
                <label for="criteria">Scoring criteria (passed to the model)</label>
                <textarea id="criteria">- How interesting and useful the question is for a broad audience;
- How many relevant topics it touches and how deeply;
- Clarity and concreteness of the wording;
- Novelty compared to typical questions.</textarea>
            </div>
            <div class="field">
                <label>Options</label>
                <div class="options">
                    <label><input id="use_prescoring" type="checkbox"> use_prescoring</label>
                    <label><input id="dedupe" type="checkbox"> dedupe</label>
                </div>
            </div>
        </div>
        <div class="actions">
            <button id="btnOnlyList" class="ghost">Candidates only (no model)</button>
            <button id="btnScoreOnly" class="secondary">Score, no final pick</button>
            <button id="btnPickBest">Score and pick winner</button>
            <span id="status" class="status"></span>
            <div class="search">
                <select id="sort">
                    <option value="as_is">Backend order</option>
                    <option value="score_desc">Score &darr;</option>
                    <option value="score_asc">Score &uarr;</option>
                    <option value="time_asc">Time &uarr;</option>
                    <option value="time_desc">Time &darr;</option>
                </select>
                <input id="search" type="text" placeholder="search question / answer / reasoning">
            </div>
        </div>
    </div>

    <div class="grid">
        <div class="card">
            <h3>Summary</h3>
            <div id="summary" class="muted">No data</div>
            <div id="winner" class="winner" style="display:none"></div>
        </div>
        <div class="card">
            <h3>Raw model output</h3>
            <div class="raw-actions">
                <button id="rawCopy" class="ghost">Copy</button>
                <label class="mono"><input id="rawWrap" type="checkbox"> wrap long lines</label>
            </div>
            <pre id="raw" class="mono"></pre>
        </div>
    </div>

    <div class="card" style="margin-top:16px">
        <div style="display:flex; align-items:center; gap:10px; margin-bottom:8px">
            <h3 style="margin:0">Candidates</h3>
            <span id="cnt" class="pill">0</span>
        </div>
        <div class="table-wrap">
            <table id="table">
                <thead>
                    <tr>
                        <th class="nowrap">#</th>
                        <th class="nowrap">Score</th>
                        <th>msg_id</th>
                        <th>chat_id</th>
                        <th class="nowrap">time (UTC)</th>
                        <th>question</th>
                        <th>answer</th>
                        <th>reason</th>
                    </tr>
                </thead>
                <tbody></tbody>
            </table>
        </div>
    </div>
</div>

<script>
    const API_PATH = '/api/pick_best_question';
    const DEFAULT_TZ = 'Europe/Amsterdam';
    const DEFAULT_LIMIT = 200;
    const WINDOW_HOURS = 6;
    const PREVIEW_CHARS = 220;
    const PLACEHOLDER = '—';

    const $ = sel => document.querySelector(sel);
    const BUTTONS = ['#btnOnlyList', '#btnScoreOnly', '#btnPickBest'];

    let lastResponse = null;

    // Value for a datetime-local input, in the viewer's wall clock
    function toInputLocal(dt) {
        const pad = n => String(n).padStart(2, '0');
        return `${dt.getFullYear()}-${pad(dt.getMonth() + 1)}-${pad(dt.getDate())}T${pad(dt.getHours())}:${pad(dt.getMinutes())}`;
    }

    function escapeHtml(value) {
        return String(value ?? '').replace(/[&<>"']/g, c => ({
            '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;'
        }[c]));
    }

    // Keep 65% of the budget from the start and 25% from the end
    function truncateMiddle(s, max = 160) {
        if (!s) return '';
        const chars = Array.from(String(s));
        if (chars.length <= max) return chars.join('');
        const head = Math.floor(max * 0.65);
        const tail = Math.floor(max * 0.25);
        const suffix = tail > 0 ? chars.slice(chars.length - tail).join('') : '';
        return chars.slice(0, head).join('') + '…' + suffix;
    }

    function collapsibleCell(text, label) {
        const raw = String(text ?? '');
        const preview = truncateMiddle(raw.replace(/\s+/g, ' ').trim(), PREVIEW_CHARS);
        return `
            <details class="collapsible">
                <summary>${escapeHtml(label)}</summary>
                <div class="preview">${escapeHtml(preview || PLACEHOLDER)}</div>
                <pre class="full mono">${escapeHtml(raw || PLACEHOLDER)}</pre>
            </details>`;
    }

    function hasScore(v) {
        return typeof v === 'number' && !isNaN(v);
    }

    function scoreColor(v) {
        if (!hasScore(v)) return '#94a3b8';
        if (v >= 80) return '#16a34a';
        if (v >= 60) return '#22c55e';
        if (v >= 40) return '#eab308';
        if (v >= 20) return '#f97316';
        return '#dc2626';
    }

    function scoreCell(v) {
        const label = hasScore(v) ? String(v) : PLACEHOLDER;
        const pct = hasScore(v) ? Math.max(0, Math.min(100, v)) : 0;
        const color = scoreColor(v);
        return `
            <div class="badge mono" style="border-color:${color}; color:${color}">${escapeHtml(label)}</div>
            <div class="scorebar" title="${escapeHtml(label)}">
                <span style="width:${pct}%; background:${color}"></span>
            </div>`;
    }

    // Missing scores go last in both directions
    function compareScores(a, b, descending) {
        const sa = hasScore(a.model_score), sb = hasScore(b.model_score);
        if (sa && sb) return descending ? b.model_score - a.model_score : a.model_score - b.model_score;
        if (sa) return -1;
        if (sb) return 1;
        return 0;
    }

    function compareTimes(a, b) {
        const ta = a.created_at_iso || '', tb = b.created_at_iso || '';
        return ta < tb ? -1 : (ta > tb ? 1 : 0);
    }

    function sortRows(rows, key) {
        switch (key) {
            case 'score_desc': return rows.sort((a, b) => compareScores(a, b, true));
            case 'score_asc': return rows.sort((a, b) => compareScores(a, b, false));
            case 'time_asc': return rows.sort(compareTimes);
            case 'time_desc': return rows.sort((a, b) => compareTimes(b, a));
            default: return rows;
        }
    }

    function matchesQuery(c, q) {
        if (!q) return true;
        const hay = [c.msg_id, c.chat_id, c.content, c.answer, c.model_reason]
            .map(v => v ?? '')
            .join(' ')
            .toLowerCase();
        return hay.includes(q);
    }

    function renderTable(res) {
        const tbody = $('#table tbody');
        tbody.innerHTML = '';
        const q = ($('#search').value || '').toLowerCase();
        const rows = sortRows((res?.candidates || []).slice(), $('#sort').value);

        for (const c of rows) {
            if (!matchesQuery(c, q)) continue;
            const tr = document.createElement('tr');
            tr.innerHTML = `
                <td class="mono nowrap">${escapeHtml(c.rank)}</td>
                <td style="min-width:110px">${scoreCell(c.model_score)}</td>
                <td class="mono">${escapeHtml(c.msg_id)}</td>
                <td class="mono">${escapeHtml(c.chat_id)}</td>
                <td class="mono nowrap">${escapeHtml(c.created_at_iso)}</td>
                <td>${escapeHtml(c.content)}</td>
                <td>${collapsibleCell(c.answer, 'answer: show/hide')}</td>
                <td>${collapsibleCell(c.model_reason, 'reasoning: show/hide')}</td>`;
            tbody.appendChild(tr);
        }
    }

    function renderSummary(res) {
        const total = res?.candidates_count ?? 0;
        const scores = (res?.candidates || []).map(c => c.model_score).filter(hasScore);
        const avg = scores.length > 0
            ? Math.round(10 * scores.reduce((s, v) => s + v, 0) / scores.length) / 10
            : null;

        $('#cnt').textContent = total;
        const parts = [`Candidates: ${total}`, `Scored: ${scores.length}${avg != null ? ` (avg: ${avg})` : ''}`];
        if (res?.winner_msg_id) parts.push(`Winner: ${res.winner_msg_id}`);
        $('#summary').textContent = parts.join(' · ');
        $('#summary').className = 'muted';

        const winner = $('#winner');
        if (res?.winner_msg_id) {
            winner.style.display = '';
            winner.innerHTML = `
                <div class="mono">msg_id: <b>${escapeHtml(res.winner_msg_id)}</b></div>
                <div style="margin:6px 0 8px 0"><b>${escapeHtml(res.winner_content)}</b></div>
                <div class="muted">Reason: ${escapeHtml(res.model_reason || PLACEHOLDER)}</div>`;
        } else {
            winner.style.display = 'none';
            winner.innerHTML = '';
        }
    }

    function render(res) {
        lastResponse = res;
        renderSummary(res);
        $('#raw').textContent = res?.raw_model_output || '';
        renderTable(res);
    }

    function setBusy(busy) {
        for (const sel of BUTTONS) $(sel).disabled = busy;
        $('#status').textContent = busy ? 'working…' : '';
    }

    function buildPayload(mode) {
        const limit = parseInt($('#limit').value || String(DEFAULT_LIMIT), 10);
        return {
            start: $('#start').value.replace('T', ' '),
            end: $('#end').value.replace('T', ' '),
            tz: $('#tz').value || DEFAULT_TZ,
            candidate_limit: Math.max(1, isNaN(limit) ? DEFAULT_LIMIT : limit),
            use_prescoring: $('#use_prescoring').checked,
            dedupe: $('#dedupe').checked,
            scoring_criteria: $('#criteria').value,
            do_final_llm_selection: mode === 'scoreAndPick',
            return_candidates_only: mode === 'onlyList'
        };
    }

    // mode: 'onlyList' | 'scoreOnly' | 'scoreAndPick'
    async function call(mode) {
        setBusy(true);
        try {
            const r = await fetch(API_PATH, {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify(buildPayload(mode))
            });
            if (!r.ok) throw new Error(`HTTP ${r.status}`);
            render(await r.json());
        } catch (e) {
            $('#summary').className = '';
            $('#summary').innerHTML = `<span class="error">Error: ${escapeHtml(e.message || String(e))}</span>`;
            $('#raw').textContent = '';
        } finally {
            setBusy(false);
        }
    }

    function flashLabel(btn, text) {
        btn.textContent = text;
        setTimeout(() => { btn.textContent = 'Copy'; }, 1200);
    }

    document.addEventListener('DOMContentLoaded', () => {
        const end = new Date();
        const start = new Date(end.getTime() - WINDOW_HOURS * 60 * 60 * 1000);
        $('#start').value = toInputLocal(start);
        $('#end').value = toInputLocal(end);

        $('#btnOnlyList').addEventListener('click', () => call('onlyList'));
        $('#btnScoreOnly').addEventListener('click', () => call('scoreOnly'));
        $('#btnPickBest').addEventListener('click', () => call('scoreAndPick'));
        $('#search').addEventListener('input', () => { if (lastResponse) renderTable(lastResponse); });
        $('#sort').addEventListener('change', () => { if (lastResponse) renderTable(lastResponse); });

        $('#rawCopy').addEventListener('click', async () => {
            const btn = $('#rawCopy');
            try {
                await navigator.clipboard.writeText($('#raw').textContent || '');
                flashLabel(btn, 'Copied');
            } catch {
                flashLabel(btn, 'Copy failed');
            }
        });

        $('#rawWrap').addEventListener('change', e => {
            $('#raw').classList.toggle('wrapped', e.target.checked);
        });
    });
</script>
</body>
</html>
"##;
