use crate::scraper::config::ChromeOptions;

/// In-page script run by the Chrome extractor.
///
/// Metadata is read first, since stripping can remove `<head>` children on
/// some sites. The script evaluates to
/// `{ html, text, title, description, image, published }`.
pub struct PageScript {
    content_selectors: Vec<String>,
    strip_selectors: Vec<String>,
}

impl PageScript {
    pub fn new(options: &ChromeOptions) -> Self {
        Self {
            content_selectors: options.content_selectors.clone(),
            strip_selectors: options.strip_selectors.clone(),
        }
    }

    pub fn source(&self) -> String {
        let pick = js_array(&self.content_selectors);
        let strip = js_array(&self.strip_selectors);

        format!(
            r#"
            (() => {{
                const meta = (...keys) => {{
                    for (const key of keys) {{
                        const el = document.querySelector(`meta[property="${{key}}"], meta[name="${{key}}"]`);
                        const value = el && el.getAttribute('content');
                        if (value && value.trim()) return value.trim();
                    }}
                    return null;
                }};
                const found = {{
                    title: meta('og:title', 'twitter:title') || (document.title || null),
                    description: meta('og:description', 'description', 'twitter:description'),
                    image: meta('og:image', 'og:image:url', 'twitter:image'),
                    published: meta('article:published_time', 'og:published_time', 'date'),
                    html: '',
                    text: '',
                }};

                {strip}.forEach(sel => document.querySelectorAll(sel).forEach(el => el.remove()));

                const region = {pick}
                    .map(sel => document.querySelector(sel))
                    .find(el => el && el.innerText.trim().length > 100) || document.body;

                if (region) {{
                    found.html = region.innerHTML;
                    found.text = region.innerText;
                }}
                return found;
            }})()
            "#
        )
    }
}

/// A JS array literal; JSON string escaping is valid JS.
fn js_array(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_embeds_selectors_and_metadata() {
        let script = PageScript::new(&ChromeOptions::default()).source();

        assert!(script.contains(r#"["article","[role=\"main\"]","main""#));
        assert!(script.contains(r#""noscript"]"#));
        assert!(script.contains("og:image"));
        assert!(script.contains("article:published_time"));
    }

    #[test]
    fn test_quotes_in_selectors_are_escaped() {
        let options = ChromeOptions {
            content_selectors: vec![r#"div[data-x="y"]"#.to_string()],
            ..Default::default()
        };
        let script = PageScript::new(&options).source();
        assert!(script.contains(r#"["div[data-x=\"y\"]"]"#));
    }
}
