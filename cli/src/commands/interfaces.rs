use pnet::datalink::NetworkInterface;

use camscout_common::config::Config;
use camscout_common::network::interface;
use camscout_common::utils::interface::NetworkInterfaceExtension;

use crate::mprint;
use crate::terminal::{format, print};

pub fn interfaces(cfg: &Config) -> anyhow::Result<()> {
    let mut interfaces: Vec<NetworkInterface> = interface::list_interfaces()?;
    if let Some(name) = &cfg.interface {
        interfaces.retain(|candidate| &candidate.name == name);
    }

    print::header("network interfaces", cfg.quiet);
    for (idx, iface) in interfaces.iter().enumerate() {
        print::tree_head(idx, &iface.name);
        print::as_tree_one_level(format::interface_details(iface));
        if idx + 1 != interfaces.len() {
            mprint!();
        }
    }

    let usable: usize = interface::usable_addresses(interfaces.clone()).count();
    let candidates: usize = interfaces.iter().filter(|iface| iface.has_ipv4()).count();
    mprint!();
    print::aligned_line("Probing from", format!("{usable} address(es)"), 12);
    print::aligned_line("With IPv4", format!("{candidates} interface(s)"), 12);
    print::end_of_program(cfg.quiet);
    Ok(())
}
