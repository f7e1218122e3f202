//! The single-page site shell.

use std::fmt::Write;

use crate::content::{Content, Language, Project};

use super::escape;
use super::reveal::RevealPreset;

/// Full HTML document for one language.
#[must_use]
pub fn render(content: &Content, lang: Language) -> String {
    let mut main = String::new();
    main.push_str(&hero(content));
    main.push_str(&about(content));
    main.push_str(&problem_and_solutions(content));
    main.push_str(&how_it_works(content));
    main.push_str(&impact_and_industry(content));
    main.push_str(&portfolio(content));
    main.push_str(&why_and_testimonials(content));
    main.push_str(&closing(content));

    html_shell(lang, &nav(content, lang), &main, &chat_widget(lang))
}

fn html_shell(lang: Language, nav: &str, main: &str, widget: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="{tag}" class="dark">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Slashtech builds data, integration and infrastructure systems.">
    <title>Slashtech</title>

    <script type="module" src="/static/main.js"></script>
    <link rel="stylesheet" href="/static/app.css">
</head>
<body class="min-h-screen bg-background text-textPrimary antialiased">
{nav}
    <main id="app">
{main}
    </main>
{widget}
</body>
</html>"#,
        tag = lang.html_tag(),
    )
}

fn nav(content: &Content, lang: Language) -> String {
    let n = &content.nav;
    let other = lang.toggled();
    format!(
        r##"    <header class="site-nav">
        <a href="/?lang={code}" class="site-nav__brand">Slashtech</a>
        <nav>
            <a href="#solutions">{solutions}</a>
            <a href="#portfolio">{work}</a>
            <a href="#about">{about}</a>
            <a href="#contact">{contact}</a>
        </nav>
        <a href="/?lang={other_code}" class="site-nav__lang" hreflang="{other_tag}">{other_code}</a>
    </header>"##,
        code = lang.code(),
        solutions = escape(&n.solutions),
        work = escape(&n.work),
        about = escape(&n.about),
        contact = escape(&n.contact),
        other_code = other.code(),
        other_tag = other.html_tag(),
    )
}

fn section(id: &str, preset: RevealPreset, inner: &str) -> String {
    format!(
        "        <section id=\"{id}\"{}>\n{inner}\n        </section>\n",
        preset.data_attributes()
    )
}

fn list(items: &[String]) -> String {
    let mut out = String::from("<ul>");
    for item in items {
        let _ = write!(out, "<li>{}</li>", escape(item));
    }
    out.push_str("</ul>");
    out
}

fn hero(c: &Content) -> String {
    let h = &c.hero;
    section(
        "hero",
        RevealPreset::HEADER,
        &format!(
            r##"<h1>{}</h1><p class="lead">{}</p><p>{}</p><a class="btn" href="#contact">{}</a><a class="btn btn--ghost" href="#portfolio">{}</a>"##,
            escape(&h.headline),
            escape(&h.subheadline),
            escape(&h.value_statement),
            escape(&h.cta1),
            escape(&h.cta2),
        ),
    )
}

fn about(c: &Content) -> String {
    let a = &c.about_us;
    let mut values = String::new();
    for v in &a.values.items {
        let _ = write!(
            values,
            "<li><strong>{}</strong> {}</li>",
            escape(&v.name),
            escape(&v.description)
        );
    }
    section(
        "about",
        RevealPreset::HEADER,
        &format!(
            "<h2>{}</h2><p>{}</p><div class=\"cards\"><article><h3>{}</h3><p>{}</p></article><article><h3>{}</h3><p>{}</p></article></div><h3>{}</h3><ul>{values}</ul>",
            escape(&a.title),
            escape(&a.subtitle),
            escape(&a.mission.title),
            escape(&a.mission.text),
            escape(&a.vision.title),
            escape(&a.vision.text),
            escape(&a.values.title),
        ),
    )
}

fn problem_and_solutions(c: &Content) -> String {
    let p = &c.problem;
    let s = &c.solutions;
    let mut out = section(
        "problem",
        RevealPreset::FADE,
        &format!(
            "<h2>{}</h2><p>{}</p>{}<p>{}</p>",
            escape(&p.title),
            escape(&p.copy),
            list(&p.challenges),
            escape(&p.footer)
        ),
    );
    out.push_str(&section(
        "solutions",
        RevealPreset::CARDS,
        &format!(
            "<h2>{}</h2><p>{}</p><div class=\"services\">{}</div><p>{}</p>",
            escape(&s.title),
            escape(&s.copy),
            s.items
                .iter()
                .enumerate()
                .map(|(i, item)| service_card(i, item))
                .collect::<String>(),
            escape(&s.footer)
        ),
    ));
    out
}

/// Stock images cycled through the service cards until a visual is generated.
const SERVICE_PLACEHOLDERS: [&str; 6] = [
    "1460925895917-afdab827c52f",
    "1551288049-bebda4e38f71",
    "1504868584819-f8e905263543",
    "1518186239751-03e779722530",
    "1551434678-e076c223a692",
    "1451187580459-43490279c0fa",
];

fn service_card(idx: usize, name: &str) -> String {
    format!(
        r#"<article class="service" data-service="{name}"><span class="service__num">{num:02}</span><h3>{name}</h3><div class="service__visual"><img src="https://images.unsplash.com/photo-{photo}?auto=format&amp;fit=crop&amp;q=80&amp;w=600&amp;h=400" alt="{name}"></div><button class="regen" data-regenerate="service">Regenerate Visual</button></article>"#,
        name = escape(name),
        num = idx + 1,
        photo = SERVICE_PLACEHOLDERS[idx % SERVICE_PLACEHOLDERS.len()],
    )
}

fn how_it_works(c: &Content) -> String {
    let mut steps = String::from("<ol>");
    for step in &c.how_it_works.steps {
        let _ = write!(
            steps,
            "<li><h3>{}</h3><p>{}</p></li>",
            escape(&step.title),
            escape(&step.description)
        );
    }
    steps.push_str("</ol>");
    section(
        "how-it-works",
        RevealPreset::CARDS,
        &format!("<h2>{}</h2>{steps}", escape(&c.how_it_works.title)),
    )
}

fn impact_and_industry(c: &Content) -> String {
    let mut out = section(
        "impact",
        RevealPreset::FADE,
        &format!(
            "<h2>{}</h2>{}",
            escape(&c.impact.title),
            list(&c.impact.outcomes)
        ),
    );
    out.push_str(&section(
        "industry",
        RevealPreset::CARDS,
        &format!(
            "<h2>{}</h2>{}",
            escape(&c.industry.title),
            list(&c.industry.sectors)
        ),
    ));
    out
}

fn project_card(p: &Project) -> String {
    let img = if p.image.is_empty() {
        String::new()
    } else {
        format!(r#"<img src="{}" alt="{}">"#, escape(&p.image), escape(&p.title))
    };
    let tags: String = p
        .tags
        .iter()
        .map(|t| format!("<span class=\"tag\">{}</span>", escape(t)))
        .collect();
    format!(
        r#"<article class="project" data-project-id="{id}" data-title="{title}" data-category="{category}"><div class="project__visual">{img}</div><span class="project__category">{category}</span><h3>{title}</h3><p>{desc}</p><p class="project__metric"><strong>{metric}</strong> {label}</p><div class="tags">{tags}</div><button class="regen" data-regenerate="project">&#x21bb;</button></article>"#,
        id = escape(&p.id),
        title = escape(&p.title),
        category = escape(&p.category),
        desc = escape(&p.description),
        metric = escape(&p.metric),
        label = escape(&p.metric_label),
    )
}

fn portfolio(c: &Content) -> String {
    let cards: String = c.portfolio.projects.iter().map(project_card).collect();
    section(
        "portfolio",
        RevealPreset::CARDS,
        &format!(
            "<h2>{}</h2><div class=\"projects\">{cards}</div>",
            escape(&c.portfolio.title)
        ),
    )
}

fn why_and_testimonials(c: &Content) -> String {
    let mut out = section(
        "why",
        RevealPreset::CARDS,
        &format!(
            "<h2>{}</h2>{}",
            escape(&c.why_choose.title),
            list(&c.why_choose.reasons)
        ),
    );
    let mut quotes = String::new();
    for t in &c.testimonials.items {
        let _ = write!(
            quotes,
            "<blockquote><p>{}</p><footer>{}, {} &middot; {}</footer></blockquote>",
            escape(&t.quote),
            escape(&t.author),
            escape(&t.role),
            escape(&t.company)
        );
    }
    out.push_str(&section(
        "testimonials",
        RevealPreset::FADE,
        &format!("<h2>{}</h2>{quotes}", escape(&c.testimonials.title)),
    ));
    out
}

fn closing(c: &Content) -> String {
    let mut out = section(
        "partnership",
        RevealPreset::FADE,
        &format!(
            "<h2>{}</h2><p>{}</p>",
            escape(&c.partnership.title),
            escape(&c.partnership.copy)
        ),
    );
    let f = &c.final_cta;
    out.push_str(&section(
        "contact",
        RevealPreset::HEADER,
        &format!(
            "<h2>{}</h2><p>{}</p><a class=\"btn\" href=\"mailto:hello@slashtech.id\">{}</a><a class=\"btn btn--ghost\" href=\"#portfolio\">{}</a>",
            escape(&f.title),
            escape(&f.copy),
            escape(&f.cta1),
            escape(&f.cta2)
        ),
    ));
    out
}

/// Mount point of the chat widget. The client reads its strings and
/// suggested prompts from the data attributes.
fn chat_widget(lang: Language) -> String {
    let strings = serde_json::to_string(&lang.widget_strings()).unwrap_or_default();
    let prompts = serde_json::to_string(lang.suggested_prompts()).unwrap_or_default();
    format!(
        r#"    <chat-widget lang="{code}" data-endpoint="/api/chat" data-history="/api/chat/history/fragment" data-strings="{strings}" data-prompts="{prompts}"></chat-widget>"#,
        code = lang.code(),
        strings = escape(&strings),
        prompts = escape(&prompts),
    )
}
