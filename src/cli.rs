//! Interactive console for the control surface.
//!
//! Stands in for the graphical rack UI: every ConfigStore and Transport
//! operation is reachable as a command, and drags are replayed with the
//! `set` command instead of pointer motion.

use anyhow::Result;
use rustyline::DefaultEditor;

use crate::surface::ControlSurface;

const HELP: &str = "\
Commands:
  status                      transport status and selection
  outputs                     list MIDI outputs
  select <id>                 select an output (persisted)
  racks                       print the document
  add-rack                    add an empty rack
  rm-rack <rack>              remove a rack and its knobs
  name <rack> <text>          rename a rack
  channel <rack> <1-16>       set a rack's MIDI channel
  add-knob <rack>             add a knob with default label/CC
  rm-knob <rack> <knob>       remove a knob
  label <rack> <knob> <text>  relabel a knob
  cc <rack> <knob> <0-127>    set a knob's CC number
  set <rack> <knob> <0..1>    set a knob's value and send it
  send-all [rack]             re-send current values
  export [path]               write banks JSON (default: derived name)
  import <path>               replace the document from banks JSON
  exit";

pub fn run_repl(surface: &mut ControlSurface) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    println!("mididash console; 'help' for commands");

    loop {
        // midir has no hot-plug callback; re-enumerate before each prompt
        surface.transport_mut().refresh_outputs();

        let line = match rl.readline("mididash> ") {
            Ok(line) => line,
            Err(_) => break,
        };
        let _ = rl.add_history_entry(&line);

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => {}
            ["exit"] | ["quit"] => break,
            ["help"] => println!("{}", HELP),
            ["status"] => print_status(surface),
            ["outputs"] => print_outputs(surface),
            ["select", id] => {
                surface.transport_mut().select_output(id);
                surface.transport_mut().refresh_outputs();
                print_status(surface);
            }
            ["racks"] => print_document(surface),
            ["add-rack"] => {
                let id = surface.store_mut().add_rack();
                println!("added rack {}", id);
            }
            ["rm-rack", rack] => {
                report(parse_id(rack).and_then(|r| Ok(surface.store_mut().remove_rack(r)?)));
            }
            ["name", rack, rest @ ..] if !rest.is_empty() => {
                let name = rest.join(" ");
                report(parse_id(rack).and_then(|r| Ok(surface.store_mut().rename_rack(r, &name)?)));
            }
            ["channel", rack, ch] => {
                report(parse_id(rack).and_then(|r| {
                    let ch: i64 = ch.parse()?;
                    Ok(surface.store_mut().set_channel(r, ch)?)
                }));
            }
            ["add-knob", rack] => {
                report(parse_id(rack).and_then(|r| {
                    let id = surface.store_mut().add_knob(r)?;
                    println!("added knob {}", id);
                    Ok(())
                }));
            }
            ["rm-knob", rack, knob] => {
                report(parse_ids(rack, knob).and_then(|(r, k)| {
                    Ok(surface.store_mut().remove_knob(r, k)?)
                }));
            }
            ["label", rack, knob, rest @ ..] if !rest.is_empty() => {
                let label = rest.join(" ");
                report(parse_ids(rack, knob).and_then(|(r, k)| {
                    Ok(surface.store_mut().set_knob_label(r, k, &label)?)
                }));
            }
            ["cc", rack, knob, n] => {
                report(parse_ids(rack, knob).and_then(|(r, k)| {
                    let n: i64 = n.parse()?;
                    Ok(surface.store_mut().set_knob_cc(r, k, n)?)
                }));
            }
            ["set", rack, knob, value] => {
                report(parse_ids(rack, knob).and_then(|(r, k)| {
                    let value: f64 = value.parse()?;
                    Ok(surface.set_value(r, k, value)?)
                }));
            }
            ["send-all"] => surface.send_all(),
            ["send-all", rack] => {
                report(parse_id(rack).and_then(|r| Ok(surface.send_all_rack(r)?)));
            }
            ["export"] => {
                let path = surface.store().export_filename();
                report(write_export(surface, &path));
            }
            ["export", path] => report(write_export(surface, path)),
            ["import", path] => {
                report(std::fs::read_to_string(path).map_err(Into::into).and_then(
                    |raw| {
                        surface.store_mut().import_banks(&raw)?;
                        println!("imported {} rack(s)", surface.store().document().racks.len());
                        Ok(())
                    },
                ));
            }
            _ => println!("unknown command; 'help' for commands"),
        }
    }

    Ok(())
}

fn write_export(surface: &ControlSurface, path: &str) -> Result<()> {
    std::fs::write(path, surface.store().export_json())?;
    println!("wrote {}", path);
    Ok(())
}

fn parse_id(s: &str) -> Result<u32> {
    Ok(s.parse()?)
}

fn parse_ids(rack: &str, knob: &str) -> Result<(u32, u32)> {
    Ok((rack.parse()?, knob.parse()?))
}

fn report(result: Result<()>) {
    if let Err(e) = result {
        println!("error: {}", e);
    }
}

fn print_status(surface: &ControlSurface) {
    let transport = surface.transport();
    println!("status: {}", transport.status());
    if let Some(error) = transport.error() {
        println!("  {}", error);
    }
    match transport.selected_output() {
        Some(id) => println!("  selected: {}", id),
        None => println!("  selected: (none)"),
    }
}

fn print_outputs(surface: &ControlSurface) {
    let outputs = surface.transport().outputs();
    if outputs.is_empty() {
        println!("no MIDI output devices found");
        return;
    }
    for output in outputs {
        let marker = if surface.transport().selected_output() == Some(output.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{} {}  {}", marker, output.id, output.name);
    }
}

fn print_document(surface: &ControlSurface) {
    let doc = surface.store().document();
    if doc.racks.is_empty() {
        println!("(empty document)");
        return;
    }
    for rack in &doc.racks {
        println!("rack {} '{}' ch:{}", rack.id, rack.name, rack.channel);
        for knob in &rack.knobs {
            println!(
                "  knob {:>2} cc:{:>3} value:{:.2} ({:>3})  {}",
                knob.id,
                knob.cc,
                knob.value,
                crate::midi::to_wire_value(knob.value),
                knob.label
            );
        }
    }
}
