use html_escape::encode_text;

use crate::config::EmailConfig;
use crate::prompt::BriefingDates;

/// A finished email: subject, plain-text alternative and HTML body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl Message {
    /// Wrap a rendered fragment in the email chrome, keeping `markdown` as the text part.
    pub fn new(markdown: &str, fragment: &str, config: &EmailConfig, dates: &BriefingDates) -> Self {
        Self {
            subject: subject(config, dates),
            text: markdown.to_string(),
            html: render_email(fragment, config, dates),
        }
    }
}

pub fn subject(config: &EmailConfig, dates: &BriefingDates) -> String {
    format!("{} — {}", config.title, dates.short)
}

/// Embed a rendered fragment in the full HTML document.
///
/// `body` is inserted as-is; everything taken from config is escaped.
pub fn render_email(body: &str, config: &EmailConfig, dates: &BriefingDates) -> String {
    let title = encode_text(&config.title);
    let tagline = encode_text(&config.tagline);
    let audience = encode_text(&config.audience);
    let footer = encode_text(&config.footer);
    let date = encode_text(&dates.long);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8"/>
  <meta name="viewport" content="width=device-width,initial-scale=1.0"/>
  <title>{title} — {date}</title>
  <link href="https://fonts.googleapis.com/css2?family=Playfair+Display:wght@400;700;900&display=swap" rel="stylesheet"/>
</head>
<body style="margin:0;padding:0;background:#ede8dc;font-family:Georgia,serif;">

<table width="100%" cellpadding="0" cellspacing="0" style="background:#ede8dc;padding:28px 0;">
<tr><td align="center">
<table width="680" cellpadding="0" cellspacing="0" style="max-width:680px;width:100%;background:#f5f0e8;border:1px solid #c9bfaa;">

  <tr><td style="padding:0 44px;">
    <table width="100%" cellpadding="0" cellspacing="0"><tr>
      <td style="height:4px;background:#0f0f0f;"></td>
    </tr></table>
  </td></tr>

  <tr><td style="padding:28px 44px 22px;text-align:center;background:#f5f0e8;border-bottom:3px double #0f0f0f;">
    <p style="margin:0 0 8px;font-family:'Helvetica Neue',Arial,sans-serif;font-size:9px;font-weight:700;letter-spacing:0.4em;text-transform:uppercase;color:#c8401a;">
      {tagline}
    </p>
    <h1 style="margin:0;font-family:'Playfair Display',Georgia,serif;font-size:48px;font-weight:900;line-height:1;letter-spacing:-1.5px;color:#0f0f0f;">
      {title}
    </h1>
    <p style="margin:10px 0 0;font-family:'Helvetica Neue',Arial,sans-serif;font-size:9px;letter-spacing:0.25em;color:#6b7280;text-transform:uppercase;">
      {date}
    </p>
    <table width="100%" cellpadding="0" cellspacing="0" style="margin-top:14px;"><tr>
      <td style="border-top:1px solid #c9bfaa;"></td>
      <td style="padding:0 12px;white-space:nowrap;">
        <span style="font-family:'Helvetica Neue',Arial,sans-serif;font-size:8px;letter-spacing:0.3em;text-transform:uppercase;color:#9ca3af;">
          {audience}
        </span>
      </td>
      <td style="border-top:1px solid #c9bfaa;"></td>
    </tr></table>
  </td></tr>

  <tr><td style="padding:30px 44px 36px;background:#f5f0e8;">
{body}
  </td></tr>

  <tr><td style="padding:16px 44px 20px;border-top:3px double #0f0f0f;text-align:center;background:#f5f0e8;">
    <p style="margin:0 0 4px;font-family:'Helvetica Neue',Arial,sans-serif;font-size:8px;letter-spacing:0.25em;text-transform:uppercase;color:#9ca3af;">
      {title} &nbsp;·&nbsp; {footer}
    </p>
    <p style="margin:0;font-family:'Helvetica Neue',Arial,sans-serif;font-size:8px;letter-spacing:0.2em;text-transform:uppercase;color:#c9bfaa;">
      For internal use only &nbsp;·&nbsp; {date}
    </p>
  </td></tr>

  <tr><td style="padding:0 44px;">
    <table width="100%" cellpadding="0" cellspacing="0"><tr>
      <td style="height:4px;background:#c8401a;"></td>
    </tr></table>
  </td></tr>

</table>
</td></tr></table>

</body>
</html>
"#
    )
}
