//! Schema command

use anyhow::Result;
use comfy_table::{Cell, Color, Table};

use crate::context::Context;
use crate::output::{print_field, print_section, OutputFormat};

/// List schema descriptors.
pub fn execute(ctx: &Context) -> Result<()> {
    match ctx.output {
        OutputFormat::Json => {
            let fields: Vec<serde_json::Value> = ctx
                .schema
                .iter()
                .map(|descriptor| {
                    serde_json::json!({
                        "name": descriptor.external_name(),
                        "title": descriptor.title(),
                        "type": descriptor.field_type().as_tag(),
                        "relation_path": descriptor.relation_path(),
                    })
                })
                .collect();

            println!("{}", serde_json::to_string_pretty(&fields)?);
        }
        OutputFormat::Table => {
            print_section("Schema");
            print_field("Title", ctx.schema.title().unwrap_or("-"));
            print_field("Fields", &ctx.schema.len().to_string());

            let mut table = Table::new();
            table.set_header(vec![
                Cell::new("Field").fg(Color::Cyan),
                Cell::new("Type").fg(Color::Cyan),
                Cell::new("SOQL Path").fg(Color::Cyan),
            ]);

            for descriptor in ctx.schema.iter() {
                table.add_row(vec![
                    Cell::new(descriptor.external_name()),
                    Cell::new(descriptor.field_type()),
                    Cell::new(descriptor.relation_path()),
                ]);
            }

            println!("{table}");
        }
    }

    Ok(())
}
