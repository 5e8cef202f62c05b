use anyhow::{Context, Result, bail};
use mailprobe_lib::{Attachment, BackendPreference, EmailSender, OutgoingEmail, SendResult};

use crate::args::SendArgs;

pub async fn build_email(args: &SendArgs) -> Result<OutgoingEmail> {
    let mut attachments = Vec::with_capacity(args.attach.len());
    for path in &args.attach {
        let attachment = Attachment::from_path(path)
            .await
            .with_context(|| format!("load attachment {path}"))?;
        attachments.push(attachment);
    }

    let mut headers = Vec::with_capacity(args.header.len());
    for raw in &args.header {
        headers.push(parse_header(raw)?);
    }

    Ok(OutgoingEmail {
        from: args.from.clone(),
        to: args.to.clone(),
        cc: args.cc.clone(),
        bcc: args.bcc.clone(),
        reply_to: args.reply_to.clone(),
        subject: args.subject.clone(),
        text: args.text.clone(),
        html: args.html.clone(),
        attachments,
        headers,
    })
}

/// `Name: value` as given to `--header`.
pub fn parse_header(raw: &str) -> Result<(String, String)> {
    let Some((name, value)) = raw.split_once(':') else {
        bail!("--header '{raw}' must look like 'Name: value'");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("--header '{raw}' has an empty name");
    }
    Ok((name.to_string(), value.trim().to_string()))
}

pub async fn run(sender: &EmailSender, args: &SendArgs) -> Result<SendResult> {
    let email = build_email(args).await?;
    let preference = match args.backend()? {
        Some(kind) => BackendPreference::Only(kind),
        None => BackendPreference::Auto,
    };
    Ok(sender.send(&email, preference).await)
}
