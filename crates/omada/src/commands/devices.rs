//! Device command handlers.

use omada_api::{Device, Port};
use tabled::Tabled;

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::Controller;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Mem")]
    mem: String,
    #[tabled(rename = "Ports")]
    ports: String,
    #[tabled(rename = "Upgrade")]
    upgrade: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            name: d.name.clone(),
            dtype: d.device_type.clone(),
            model: d.model.clone(),
            ip: d.ip.clone(),
            mac: d.mac.clone(),
            cpu: format!("{:.0}%", d.cpu_util),
            mem: format!("{:.0}%", d.mem_util),
            ports: if d.is_switch() {
                let up = d.ports.iter().filter(|p| p.port_status.is_up()).count();
                format!("{up}/{}", d.ports.len())
            } else {
                "-".into()
            },
            upgrade: if d.need_upgrade { "yes".into() } else { String::new() },
        }
    }
}

#[derive(Tabled)]
struct PortRow {
    #[tabled(rename = "#")]
    port: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Link")]
    link: String,
    #[tabled(rename = "PoE")]
    poe: String,
    #[tabled(rename = "RX")]
    rx: i64,
    #[tabled(rename = "TX")]
    tx: i64,
}

impl From<&Port> for PortRow {
    fn from(p: &Port) -> Self {
        Self {
            port: p.port,
            name: p.name.clone(),
            link: if p.port_status.is_up() {
                "up".into()
            } else {
                "down".into()
            },
            poe: if p.port_status.poe {
                format!("{:.1}W", p.port_status.poe_power)
            } else {
                "-".into()
            },
            rx: p.port_status.rx,
            tx: p.port_status.tx,
        }
    }
}

fn detail(d: &Device) -> String {
    let mut lines = vec![
        format!("Name:     {}", d.name),
        format!("MAC:      {}", d.mac),
        format!("IP:       {}", d.ip),
        format!("Model:    {}", d.model),
        format!("Type:     {}", d.device_type),
        format!("Firmware: {}", d.version),
        format!("Upgrade:  {}", if d.need_upgrade { "available" } else { "-" }),
        format!("Uptime:   {:.0}s", d.uptime),
        format!("CPU:      {:.1}%", d.cpu_util),
        format!("Memory:   {:.1}%", d.mem_util),
        format!("TX/RX:    {} / {}", d.tx_rate, d.rx_rate),
        format!("Traffic:  {} down / {} up", d.download, d.upload),
    ];
    if d.poe_remain > 0.0 {
        lines.push(format!("PoE left: {:.1}W", d.poe_remain));
    }
    if d.is_switch() {
        lines.push(String::new());
        let rows: Vec<PortRow> = d.ports.iter().map(PortRow::from).collect();
        lines.push(tabled::Table::new(rows).to_string());
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List { device_type } => {
            let mut devices = controller
                .client
                .get_devices()
                .await
                .map_err(|e| controller.error(e))?;
            if let Some(ref wanted) = device_type {
                devices.retain(|d| &d.device_type == wanted);
            }
            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::from(d),
                |d| d.mac.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { mac } => {
            let devices = controller
                .client
                .get_devices()
                .await
                .map_err(|e| controller.error(e))?;
            let found = devices
                .iter()
                .find(|d| d.mac.eq_ignore_ascii_case(&mac))
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "device".into(),
                    identifier: mac.clone(),
                    list_command: "devices list".into(),
                })?;
            let out = output::render_single(&global.output, found, detail, |d| d.mac.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Ports { mac } => {
            let ports = controller
                .client
                .get_ports(&mac)
                .await
                .map_err(|e| controller.error(e))?;
            let out = output::render_list(
                &global.output,
                &ports,
                |p| PortRow::from(p),
                |p| p.port.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
