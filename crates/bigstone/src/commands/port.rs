use anyhow::{Context, Result};
use colored::Colorize;
use inquire::{Confirm, Select, Text};
use std::path::{Path, PathBuf};

use crate::cli::PortCommands;
use crate::config::Config;
use crate::draft::PortDraft;
use crate::port::grid::{PALETTE, parse_cell_spec};
use crate::port::{PortType, Role, Submitter, Tool, coerce_count};
use crate::store::SupabaseClient;

/// Run a `port` subcommand against the draft file.
pub fn run(command: PortCommands, draft: Option<PathBuf>, quiet: bool) -> Result<()> {
    let config = Config::load_or_default();
    let path = draft.unwrap_or_else(|| config.draft_path());

    match command {
        PortCommands::Init { force } => init(&path, force),
        PortCommands::Set { field, value } => edit(&path, quiet, |d| d.set(&field, &value)),
        PortCommands::Place { cells, tool, color } => {
            let tool: Tool = tool.parse()?;
            let color = color.as_deref().map(resolve_color).transpose()?;
            edit(&path, quiet, |d| place(d, &cells, tool, color))
        }
        PortCommands::Erase { cells } => edit(&path, quiet, |d| place(d, &cells, Tool::Erase, None)),
        PortCommands::Annotate {
            cell,
            block,
            variation,
        } => edit(&path, quiet, |d| {
            let (coord, _) = parse_cell_spec(&cell)?;
            if !d.grid.annotate(coord, block.as_str(), variation.as_str()) {
                println!(
                    "{}",
                    format!("No port at {coord}; place one before annotating it.").yellow()
                );
            } else if let Some(cell) = d.grid.query(coord).filter(|_| !quiet) {
                println!("Annotated {cell}");
            }
            Ok(())
        }),
        PortCommands::Clear => edit(&path, quiet, |d| {
            d.grid.clear();
            Ok(())
        }),
        PortCommands::Show => {
            let draft = PortDraft::load(&path)?;
            print_draft(&draft, &path);
            Ok(())
        }
        PortCommands::Create => create(&path, &config),
        PortCommands::Submit => {
            let mut draft = PortDraft::load(&path)?;
            submit(&mut draft, &config)?;
            draft.save(&path)
        }
    }
}

fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "A port draft already exists at {}. Use --force to start over.",
            path.display()
        );
    }
    PortDraft::default().save(path)?;
    println!("Started a new port draft at {}", path.display());
    Ok(())
}

/// Load the draft, apply `change`, save it and print the live name.
fn edit(path: &Path, quiet: bool, change: impl FnOnce(&mut PortDraft) -> Result<()>) -> Result<()> {
    let mut draft = PortDraft::load(path)?;
    change(&mut draft)?;
    draft.save(path)?;
    if !quiet {
        print_summary(&draft);
    }
    Ok(())
}

/// Apply cell arguments in order. Arguments with their own `=tool` override `tool`.
fn place(draft: &mut PortDraft, cells: &[String], tool: Tool, color: Option<String>) -> Result<()> {
    let parsed = cells
        .iter()
        .map(|spec| parse_cell_spec(spec))
        .collect::<Result<Vec<_>, _>>()?;

    if color.is_some() {
        draft.grid.set_brush(color);
    }
    for (coord, own_tool) in parsed {
        draft.grid.place_or_erase(coord, own_tool.unwrap_or(tool));
    }
    Ok(())
}

/// Accept a palette name (red, blue, green) or a `#rrggbb` value.
fn resolve_color(value: &str) -> Result<String> {
    if let Some((_, hex)) = PALETTE
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
    {
        return Ok(hex.to_string());
    }
    let is_hex = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if is_hex {
        Ok(value.to_ascii_lowercase())
    } else {
        let names: Vec<&str> = PALETTE.iter().map(|(name, _)| *name).collect();
        anyhow::bail!(
            "Invalid color: {value}. Use {} or a #rrggbb value.",
            names.join(", ")
        )
    }
}

fn print_summary(draft: &PortDraft) {
    let direction = draft.direction();
    let name = draft
        .name()
        .map(|n| n.green().bold().to_string())
        .unwrap_or_else(|| "(choose a type and place a port)".dimmed().to_string());
    println!("{} {}  {} {name}", "Direction:".bold(), direction.label(), "Name:".bold());
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn print_draft(draft: &PortDraft, path: &Path) {
    let form = &draft.form;
    println!("{}", format!("Port draft ({})", path.display()).bold());
    println!(
        "  Type:            {}",
        form.port_type
            .map(|t| t.display_name().to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!("  Number of ports: {}", form.port_count);
    println!("  Role:            {}", form.role.display_name());
    println!("  Passthrough:     {}", yes_no(draft.is_passthrough()));
    if !draft.is_passthrough() {
        println!("  Input count:     {}", form.input_count);
        println!("  Output count:    {}", form.output_count);
    }
    println!(
        "  More blocks:     {} (block size {})",
        yes_no(form.uses_more_blocks),
        form.effective_block_size()
    );
    println!("  Grid colors:     {}", yes_no(form.show_grid_colors));
    println!("  Brush:           {}", draft.grid.brush().unwrap_or("none"));
    if !form.description.is_empty() {
        println!("  Description:     {}", form.description);
    }
    println!();
    print_summary(draft);

    println!();
    println!("{}", format!("Cells ({}):", draft.grid.len()).bold());
    if draft.grid.is_empty() {
        println!("  {}", "none placed".dimmed());
    }
    for cell in draft.grid.cells() {
        println!("  {cell}");
    }
}

fn submit(draft: &mut PortDraft, config: &Config) -> Result<()> {
    let backend = config.backend()?;
    let session = config.session();
    let client = SupabaseClient::new(backend.url, backend.anon_key).with_session(&session);
    let submitter = Submitter::new(client);

    let record = submitter.submit(&draft.form, &draft.grid, session.user_id())?;

    println!(
        "{} {}",
        "Port created!".green().bold(),
        if record.name.is_empty() {
            "(unnamed)".to_string()
        } else {
            record.name.clone()
        }
    );
    println!("Your port has been added to the community database.");
    draft.reset();
    Ok(())
}

/// Interactive form: fields first, then cells, then an optional submit.
fn create(path: &Path, config: &Config) -> Result<()> {
    let mut draft = PortDraft::default();

    let passthrough = Confirm::new("Passthrough port?")
        .with_default(false)
        .prompt()?;
    draft.set_passthrough(passthrough);

    if !passthrough {
        draft.form.input_count = prompt_count("Input count")?;
        draft.form.output_count = prompt_count("Output count")?;
    }

    let type_labels: Vec<&str> = PortType::all().iter().map(|t| t.display_name()).collect();
    let choice = Select::new("Type", type_labels).raw_prompt()?;
    draft.form.port_type = Some(PortType::all()[choice.index]);

    draft.form.port_count = prompt_count("Number of ports")?;

    let role_labels: Vec<&str> = Role::all().iter().map(|r| r.display_name()).collect();
    let choice = Select::new("Role", role_labels).raw_prompt()?;
    draft.form.role = Role::all()[choice.index];

    draft.form.uses_more_blocks = Confirm::new("Uses more blocks?")
        .with_default(false)
        .prompt()?;
    if draft.form.uses_more_blocks {
        draft.form.block_size = prompt_count("Block size")?;
    }

    draft.form.show_grid_colors = Confirm::new("Show colors on grid?")
        .with_default(true)
        .prompt()?;
    draft.form.description = Text::new("Description")
        .with_help_message("Describe the port's functionality")
        .prompt()?;

    let help = if passthrough {
        "x,y places a passthrough port; x,y=erase removes one; empty line to finish"
    } else {
        "x,y=input or x,y=output (x,y alone places an input); empty line to finish"
    };
    loop {
        let entry = Text::new("Cell").with_help_message(help).prompt()?;
        if entry.trim().is_empty() {
            if draft.grid.is_empty() {
                println!("{}", "Please place at least one port on the grid".red());
                continue;
            }
            break;
        }
        match parse_cell_spec(&entry) {
            Ok((coord, tool)) => {
                draft.grid.place_or_erase(coord, tool.unwrap_or_default());
                print_summary(&draft);
            }
            Err(e) => println!("{}", e.to_string().red()),
        }
    }

    println!();
    print_draft(&draft, path);
    println!();

    let submit_now = Confirm::new("Create port now?").with_default(true).prompt()?;
    if submit_now {
        let result = submit(&mut draft, config);
        if let Err(e) = result {
            draft
                .save(path)
                .with_context(|| format!("Failed to keep the draft at {}", path.display()))?;
            println!("Draft kept at {}", path.display());
            return Err(e);
        }
    } else {
        draft.save(path)?;
        println!(
            "Draft saved to {}. Submit it later with `bigstone port submit`.",
            path.display()
        );
    }
    Ok(())
}

fn prompt_count(label: &str) -> Result<u32> {
    let entry = Text::new(label).with_default("1").prompt()?;
    Ok(coerce_count(&entry))
}
