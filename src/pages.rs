//! Server-rendered HTML pages.

use crate::models::Food;

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · SmartDine</title>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
    )
}

pub fn landing() -> String {
    layout(
        "Welcome",
        r#"<main>
<h1>SmartDine</h1>
<p>Tell us how you feel, we'll tell you what to eat.</p>
<a href="/register">Create an account</a> or <a href="/login">log in</a>.
</main>"#,
    )
}

fn credentials_form(title: &str, action: &str, submit: &str, alternative: &str) -> String {
    layout(
        title,
        &format!(
            r#"<main>
<h1>{title}</h1>
<form method="post" action="{action}">
<label>Username <input name="username" required></label>
<label>Password <input name="password" type="password" required></label>
<button type="submit">{submit}</button>
</form>
{alternative}
</main>"#
        ),
    )
}

pub fn login() -> String {
    credentials_form(
        "Log in",
        "/login",
        "Log in",
        r#"<p>New here? <a href="/register">Register</a></p>"#,
    )
}

pub fn register() -> String {
    credentials_form(
        "Register",
        "/register",
        "Create account",
        r#"<p>Already registered? <a href="/login">Log in</a></p>"#,
    )
}

const DISCOVER_SCRIPT: &str = r#"
const moodGrid = document.getElementById('moodGrid');
const results = document.getElementById('results');

function card(food) {
  const item = document.createElement('li');
  const link = document.createElement('a');
  link.href = '/order/' + food.id;
  link.textContent = food.name;
  const tags = document.createElement('small');
  tags.textContent = ' ' + food.keywords.map(k => '#' + k).join(' ');
  const fav = document.createElement('button');
  fav.textContent = food.isFavorite ? '♥' : '♡';
  fav.addEventListener('click', async () => {
    const res = await fetch('/api/favorite/' + food.id, { method: 'POST' });
    if (res.ok) {
      const body = await res.json();
      fav.textContent = body.action === 'added' ? '♥' : '♡';
    }
  });
  item.append(fav, ' ', link, tags);
  return item;
}

function show(foods) {
  results.replaceChildren(...foods.map(card));
  if (foods.length === 0) results.textContent = 'No matches found.';
}

async function load(url) {
  const res = await fetch(url);
  const body = await res.json();
  return res.ok ? body : [];
}

load('/api/moods').then(moods => moods.forEach(mood => {
  const chip = document.createElement('button');
  chip.textContent = mood;
  chip.addEventListener('click', async () => show(await load('/api/search?mood=' + encodeURIComponent(mood))));
  moodGrid.appendChild(chip);
}));
document.getElementById('favorites').addEventListener('click', async () => show(await load('/api/favorites')));
document.getElementById('surprise').addEventListener('click', async () => {
  const res = await fetch('/api/surprise');
  if (res.ok) show([await res.json()]);
});
"#;

pub fn discover(username: &str) -> String {
    layout(
        "Discover",
        &format!(
            r#"<header>Hi {username} · <a href="/logout">Log out</a></header>
<main>
<h1>How are you feeling?</h1>
<div id="moodGrid"></div>
<button id="surprise">Surprise me!</button>
<button id="favorites">My favorites</button>
<ul id="results"></ul>
</main>
<script>{DISCOVER_SCRIPT}</script>"#,
            username = escape(username),
        ),
    )
}

pub fn order_confirmation(food: &Food) -> String {
    layout(
        "Order confirmed",
        &format!(
            r#"<main>
<h1>Order confirmed</h1>
<p>Your <strong>{name}</strong> is on its way.</p>
<a href="/discover">Back to discovering</a>
</main>"#,
            name = escape(&food.name),
        ),
    )
}
