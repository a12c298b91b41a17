//! Server-rendered HTML for the viewer page.

mod escape;

use std::fmt;

use blobview_core::PageSize;
use url::form_urlencoded;

pub use self::escape::Escaped;
use crate::service::{ItemView, Notice, PageView, ViewerSettings};

/// Page title.
const TITLE: &str = "Azure Blob Image Viewer";

/// Shown when a successful listing has no images.
pub const EMPTY_PAGE_MESSAGE: &str = "No images found on this page. Adjust filters or paging.";

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;background:#f6f7f9;color:#1b1f24}\
main{max-width:1100px;margin:0 auto;padding:1.5rem}\
fieldset{display:grid;grid-template-columns:repeat(auto-fit,minmax(240px,1fr));gap:.75rem;border:1px solid #d0d7de;border-radius:6px}\
label{display:flex;flex-direction:column;font-size:.9rem;gap:.25rem}\
label.inline{flex-direction:row;align-items:center}\
input{padding:.35rem;font:inherit}\
nav.paging{display:flex;align-items:center;gap:.75rem;margin:1rem 0}\
.notice{padding:.75rem 1rem;border-radius:6px;margin:1rem 0;background:#ddf4ff}\
.notice.error{background:#ffebe9}\
.grid{display:grid;grid-template-columns:repeat(3,1fr);gap:1rem}\
figure{margin:0;background:#fff;border:1px solid #d0d7de;border-radius:6px;padding:.5rem}\
figure img{width:100%;height:auto;display:block}\
figcaption{font-size:.85rem;word-break:break-all;margin-top:.35rem}\
.error{color:#cf222e}\
footer{margin-top:2rem;font-size:.8rem;color:#57606a}";

/// Renders the full viewer page.
pub fn render_page(view: &PageView, settings: &ViewerSettings) -> String {
    ViewerPage { view, settings }.to_string()
}

/// Returns the same-origin URL that serves the content of `name`.
pub fn content_path(name: &str) -> String {
    let segments: Vec<String> = name
        .split('/')
        .map(|segment| {
            form_urlencoded::byte_serialize(segment.as_bytes())
                .collect::<String>()
                .replace('+', "%20")
        })
        .collect();
    format!("/content/{}", segments.join("/"))
}

struct ViewerPage<'a> {
    view: &'a PageView,
    settings: &'a ViewerSettings,
}

impl fmt::Display for ViewerPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
             <meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <title>{TITLE}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<main>\n\
             <h1>{TITLE}</h1>\n"
        )?;

        f.write_str("<form method=\"post\" action=\"/\">\n")?;
        self.settings_fields(f)?;
        self.paging_controls(f)?;
        f.write_str("</form>\n")?;

        if let Some(notice) = &self.view.notice {
            write_notice(f, notice)?;
        }

        if !self.view.items.is_empty() {
            f.write_str("<section class=\"grid\">\n")?;
            for item in &self.view.items {
                write_item(f, item)?;
            }
            f.write_str("</section>\n")?;
        } else if self.view.listed {
            writeln!(f, "<p class=\"empty\">{EMPTY_PAGE_MESSAGE}</p>")?;
        }

        f.write_str(
            "<footer>Authentication: a connection string takes precedence. Otherwise the \
             account URL is used with the SAS token, or anonymously for containers with \
             public read access.</footer>\n</main>\n</body>\n</html>\n",
        )
    }
}

impl ViewerPage<'_> {
    fn settings_fields(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settings = self.settings;

        f.write_str("<fieldset class=\"settings\">\n<legend>Container</legend>\n")?;
        writeln!(
            f,
            "<label>Container <input name=\"container\" value=\"{}\" autocomplete=\"off\"></label>",
            Escaped(&settings.container)
        )?;
        writeln!(
            f,
            "<label>Account URL <input name=\"account_url\" value=\"{}\" \
             placeholder=\"https://&lt;account&gt;.blob.core.windows.net\"></label>",
            Escaped(&settings.account_url)
        )?;
        write_secret_field(f, "sas_token", "SAS token", settings.has_sas_token())?;
        write_secret_field(
            f,
            "connection_string",
            "Connection string",
            settings.has_connection_string(),
        )?;
        writeln!(
            f,
            "<label>Prefix <input name=\"prefix\" value=\"{}\"></label>",
            Escaped(&settings.prefix)
        )?;
        writeln!(
            f,
            "<label>Page size <input name=\"page_size\" type=\"number\" min=\"{}\" max=\"{}\" \
             value=\"{}\"></label>",
            PageSize::MIN,
            PageSize::MAX,
            settings.page_size.get()
        )?;
        f.write_str(
            "<label class=\"inline\"><input type=\"checkbox\" name=\"forget_credentials\" \
             value=\"true\"> Forget stored credentials</label>\n\
             <button type=\"submit\" name=\"action\" value=\"apply\">Apply</button>\n\
             </fieldset>\n",
        )
    }

    fn paging_controls(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let disabled = |enabled: bool| if enabled { "" } else { " disabled" };

        writeln!(
            f,
            "<nav class=\"paging\">\n\
             <button type=\"submit\" name=\"action\" value=\"prev\"{}>Prev</button>\n\
             <span class=\"page-number\">Page {}</span>\n\
             <button type=\"submit\" name=\"action\" value=\"next\"{}>Next</button>\n\
             <button type=\"submit\" name=\"action\" value=\"reset\">Reset paging</button>\n\
             </nav>",
            disabled(self.view.can_prev),
            self.view.page_number,
            disabled(self.view.can_next),
        )
    }
}

/// Secret inputs are always rendered empty.
fn write_secret_field(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    label: &str,
    stored: bool,
) -> fmt::Result {
    let placeholder = if stored {
        "stored, leave blank to keep"
    } else {
        "optional"
    };
    writeln!(
        f,
        "<label>{label} <input name=\"{name}\" type=\"password\" value=\"\" \
         autocomplete=\"off\" placeholder=\"{placeholder}\"></label>"
    )
}

fn write_notice(f: &mut fmt::Formatter<'_>, notice: &Notice) -> fmt::Result {
    let class = if notice.is_error() {
        "notice error"
    } else {
        "notice"
    };
    writeln!(
        f,
        "<div class=\"{class}\" role=\"status\">{}</div>",
        Escaped(notice.message())
    )
}

fn write_item(f: &mut fmt::Formatter<'_>, item: &ItemView) -> fmt::Result {
    let name = Escaped(&item.name);
    f.write_str("<figure>\n")?;

    match &item.error {
        Some(error) => {
            writeln!(f, "<figcaption>{name}</figcaption>")?;
            writeln!(
                f,
                "<p class=\"error\">Failed to load {name}: {}</p>",
                Escaped(error)
            )?;
        }
        None => {
            writeln!(
                f,
                "<img src=\"{}\" alt=\"{name}\" loading=\"lazy\">\n<figcaption>{name}</figcaption>",
                Escaped(&content_path(&item.name))
            )?;
            write!(
                f,
                "<details><summary>Details</summary><dl>\
                 <dt>Name</dt><dd>{name}</dd><dt>Type</dt><dd>{}</dd>",
                item.content_type
            )?;
            if let Some(size) = item.size {
                write!(f, "<dt>Size</dt><dd>{size} bytes</dd>")?;
            }
            f.write_str("</dl></details>\n")?;
        }
    }

    f.write_str("</figure>\n")
}
