use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use documents::{DocumentError, HttpUploader, UploadFile, UploadSlots, DEFAULT_UPLOAD_ERROR};
use prompt_core::{normalize_key, BodyElement, Composer, Prompt, TemplateMode};
use serde_json::json;

use crate::DocumentsConfig;

/// Field edits given on the command line.
#[derive(Debug, Default, PartialEq)]
pub struct Edits {
    pub values: Vec<(String, String)>,
    pub items: Vec<(String, String)>,
    pub attachments: Vec<(String, PathBuf)>,
}

impl Edits {
    pub fn parse(set: &[String], item: &[String], attach: &[String]) -> Result<Self> {
        let values = set
            .iter()
            .map(|arg| parse_assignment(arg))
            .collect::<Result<_>>()?;
        let items = item
            .iter()
            .map(|arg| parse_assignment(arg))
            .collect::<Result<_>>()?;
        let attachments = attach
            .iter()
            .map(|arg| parse_assignment(arg).map(|(id, path)| (id, PathBuf::from(path))))
            .collect::<Result<_>>()?;

        Ok(Self {
            values,
            items,
            attachments,
        })
    }
}

/// Split `ID=VALUE` at the first `=`.
fn parse_assignment(arg: &str) -> Result<(String, String)> {
    match arg.split_once('=') {
        Some((id, value)) if !id.trim().is_empty() => {
            Ok((id.trim().to_string(), value.to_string()))
        }
        _ => bail!("Expected ID=VALUE, got '{}'", arg),
    }
}

/// Legacy fields are addressed by placeholder key; accept the bracket text
/// as typed, e.g. `"CLIENT NAME"`.
fn field_id(composer: &Composer, id: &str) -> String {
    match composer.mode() {
        TemplateMode::Legacy => normalize_key(id),
        TemplateMode::Structured => id.to_string(),
    }
}

fn apply_edits(composer: &mut Composer, edits: &Edits) -> Result<()> {
    for (id, value) in &edits.values {
        let id = field_id(composer, id);
        if !composer.set_value(&id, value.as_str()) {
            if let Some(BodyElement::Pills(field)) = composer.template().field(&id) {
                bail!("'{}' must be one of: {}", id, field.options.join(", "));
            }
            bail!("No field '{}' in this prompt", id);
        }
    }

    for (id, value) in &edits.items {
        append_item(composer, id, value)?;
    }

    Ok(())
}

/// Put `value` into the first blank row of a list field, adding a row when
/// every row is taken.
fn append_item(composer: &mut Composer, id: &str, value: &str) -> Result<()> {
    let Some(BodyElement::Multi(field)) = composer.template().field(id) else {
        bail!("No list field '{}' in this prompt", id);
    };
    let max = field.max;

    let rows = composer.rows(id);
    let index = match rows.iter().position(|row| row.trim().is_empty()) {
        Some(index) => index,
        None => {
            if !composer.add_row(id) {
                bail!("'{}' takes at most {} entries", id, max);
            }
            rows.len()
        }
    };

    composer.set_row(id, index, value);
    Ok(())
}

pub async fn run(
    prompt: &Prompt,
    edits: Edits,
    documents: &DocumentsConfig,
    force: bool,
    json: bool,
) -> Result<()> {
    let mut composer = Composer::open(prompt);
    tracing::debug!(session = %composer.id(), prompt_id = prompt.id, mode = ?composer.mode(), "Composer opened");

    apply_edits(&mut composer, &edits)?;

    if !edits.attachments.is_empty() {
        let uploader =
            HttpUploader::new(&documents.base_url).with_token(documents.token.clone());
        let slots = UploadSlots::new();

        for (slot, path) in &edits.attachments {
            let file = UploadFile::from_path(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;

            match slots.attach(&uploader, &mut composer, slot, file).await {
                Ok(result) => eprintln!(
                    "{} {} ({} chunks indexed)",
                    "attached".green(),
                    result.filename,
                    result.chunks_created
                ),
                Err(DocumentError::UnknownSlot(slot)) => {
                    bail!("No upload field '{}' in this prompt", slot)
                }
                Err(_) => {
                    let message = slots
                        .error(slot)
                        .unwrap_or_else(|| DEFAULT_UPLOAD_ERROR.to_string());
                    eprintln!("{} {}: {}", "upload failed".red(), slot, message);
                }
            }
        }
    }

    let progress = composer.progress();
    let missing = composer.missing_fields();
    let complete = composer.can_send();

    if !complete && !force {
        eprintln!("{} {}", "missing:".yellow(), missing.join(", "));
    }

    let text = if force {
        composer.compile()
    } else {
        composer.send()?
    };

    if json {
        let output = json!({
            "prompt_id": prompt.id,
            "mode": prompt.mode(),
            "progress": progress,
            "complete": complete,
            "missing": missing,
            "text": text,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        eprintln!(
            "{} {}/{} required fields filled",
            "progress:".dimmed(),
            progress.filled,
            progress.total
        );
        println!("{}", text);
    }

    Ok(())
}

/// Print a prompt with its fillable fields.
pub fn show(prompt: &Prompt) {
    println!("{} {}", format!("#{}", prompt.id).cyan(), prompt.title.bold());
    if !prompt.category_label.is_empty() {
        println!("{}", prompt.category_label.dimmed());
    }
    if !prompt.description.is_empty() {
        println!("{}", prompt.description);
    }
    if !prompt.tags.is_empty() {
        println!("tags: {}", prompt.tags.join(", "));
    }
    println!();

    let composer = Composer::open(prompt);
    match composer.mode() {
        TemplateMode::Legacy => {
            println!("{}", prompt.prompt);
            println!();
            for placeholder in composer.template().placeholders() {
                let kind = match placeholder.field_kind() {
                    prompt_core::FieldKind::Short => "short",
                    prompt_core::FieldKind::Long => "long",
                };
                println!(
                    "  {:<24} {} ({}) {}",
                    placeholder.key.cyan(),
                    placeholder.label,
                    kind,
                    placeholder.input_placeholder().dimmed()
                );
            }
        }
        TemplateMode::Structured => {
            for element in composer.template().elements() {
                if let Some(line) = describe_field(element) {
                    println!("  {}", line);
                }
            }
        }
    }
}

fn describe_field(element: &BodyElement) -> Option<String> {
    let detail = match element {
        BodyElement::Token(field) => field.placeholder.clone(),
        BodyElement::Pills(field) => {
            let mut options = field.options.join(" | ");
            if field.allow_custom {
                options.push_str(" | + other");
            }
            options
        }
        BodyElement::Block(field) if field.optional => "optional".to_string(),
        BodyElement::Block(field) => field.placeholder.clone(),
        BodyElement::Upload(field) => field.accepted_types.clone(),
        BodyElement::Multi(field) => format!("up to {}", field.max),
        BodyElement::Text { .. } | BodyElement::Label { .. } | BodyElement::Or => return None,
    };

    Some(format!(
        "{:<8} {:<20} {} {}",
        element.kind().as_str(),
        element.id().unwrap_or_default().cyan(),
        element.label().unwrap_or_default(),
        detail.dimmed()
    ))
}
