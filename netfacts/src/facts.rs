//! Fact collection: show commands run on a session, fed to the parsers.

use log::{debug, warn};

use crate::channel::ShellChannel;
use crate::error::CommandError;
use crate::parse::{InterfaceRecord, parse_interface_brief};
use crate::session::Session;

/// Collect IP interfaces with their prefix lengths.
///
/// Runs the family's interface table command, then the interface config
/// command once per retained interface. A failed config command leaves that
/// record's prefix unknown; a channel failure aborts with the error.
pub async fn ip_interfaces<C: ShellChannel>(
    session: &mut Session<C>,
) -> Result<Vec<InterfaceRecord>, CommandError> {
    let family = session.family().clone();

    let table = session.run(&family.commands.interface_brief).await.into_output()?;
    let rows = parse_interface_brief(&table, &family.interface_layout);
    debug!("{}: {} interfaces retained", session.host(), rows.len());

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        if row.ip_address.is_none() {
            records.push(InterfaceRecord::resolve(row, None, &family.netmasks));
            continue;
        }

        let command = family.commands.interface_config_for(&row.name);
        let config = match session.run(&command).await.into_output() {
            Ok(config) => Some(config),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("{}: no config for {}: {}", session.host(), row.name, e);
                None
            }
        };
        records.push(InterfaceRecord::resolve(row, config.as_deref(), &family.netmasks));
    }

    Ok(records)
}

/// Read the chassis serial number with the family's serial extractor.
///
/// `Ok(None)` when the command succeeded but no serial could be extracted.
pub async fn serial_number<C: ShellChannel>(
    session: &mut Session<C>,
) -> Result<Option<String>, CommandError> {
    let command = session.family().commands.serial.clone();
    let output = session.run(&command).await.into_output()?;
    let serial = session.family().serial.extract(&output);
    if serial.is_none() {
        warn!("{}: no serial number in {:?}", session.host(), output);
    }
    Ok(serial)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio_test::io::{Builder, Mock};

    use super::*;
    use crate::channel::StreamChannel;
    use crate::error::ParseError;
    use crate::family::vendors::cisco_ios;

    const BRIEF: &str = "\
Interface              IP-Address      OK? Method Status                Protocol\r
GigabitEthernet0/0     10.1.1.1        YES manual up                    up\r
GigabitEthernet0/1     unassigned      YES unset  administratively down down\r
Loopback0              192.168.255.1   YES manual up                    up\r
Tunnel100              172.16.0.9      YES manual up                    up\r
";

    fn login(builder: &mut Builder) -> &mut Builder {
        builder
            .read(b"\r\nRouter1#")
            .write(b"terminal length 0\n")
            .read(b"terminal length 0\r\nRouter1#")
            .write(b"terminal width 511\n")
            .read(b"terminal width 511\r\nRouter1#")
    }

    fn reply(command: &str, body: &str) -> Vec<u8> {
        format!("{}\r\n{}\r\nRouter1#", command, body).into_bytes()
    }

    async fn session(mock: Mock) -> Session<StreamChannel<Mock>> {
        Session::establish(
            "router1",
            StreamChannel::new(mock),
            cisco_ios::family(),
            Duration::from_millis(200),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_ip_interfaces() {
        let gi = "show running-config interface GigabitEthernet0/0";
        let lo = "show running-config interface Loopback0";
        let tu = "show running-config interface Tunnel100";
        let mock = login(&mut Builder::new())
            .write(b"show ip interface brief\n")
            .read(&reply("show ip interface brief", BRIEF))
            .write(format!("{}\n", gi).as_bytes())
            .read(&reply(gi, "interface GigabitEthernet0/0\r\n ip address 10.1.1.1 255.255.255.0\r\nend"))
            .write(format!("{}\n", lo).as_bytes())
            .read(&reply(lo, "interface Loopback0\r\n ip address 192.168.255.1 255.255.255.255\r\nend"))
            .write(format!("{}\n", tu).as_bytes())
            .read(&reply(tu, "interface Tunnel100\r\n ip address 172.16.0.9 255.255.255.252\r\nend"))
            .build();
        let mut session = session(mock).await;

        let records = ip_interfaces(&mut session).await.unwrap();
        let lines: Vec<String> = records.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            [
                "GigabitEthernet0/0 - 10.1.1.1/24",
                "Loopback0 - 192.168.255.1/32",
                "Tunnel100 - 172.16.0.9/unknown",
            ]
        );

        session.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_ip_interfaces_survives_rejected_config_command() {
        let table = "Loopback0              192.168.255.1   YES manual up                    up";
        let lo = "show running-config interface Loopback0";
        let mock = login(&mut Builder::new())
            .write(b"show ip interface brief\n")
            .read(&reply("show ip interface brief", table))
            .write(format!("{}\n", lo).as_bytes())
            .read(&reply(lo, "% Invalid input detected at '^' marker."))
            .build();
        let mut session = session(mock).await;

        let records = ip_interfaces(&mut session).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cidr, None);
        assert_eq!(records[0].ip_address.as_deref(), Some("192.168.255.1"));

        session.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_ip_interfaces_skips_config_for_malformed_row() {
        let table = "Serial0/0/0\r\nLoopback0              192.168.255.1   YES manual up                    up";
        let lo = "show running-config interface Loopback0";
        let mock = login(&mut Builder::new())
            .write(b"show ip interface brief\n")
            .read(&reply("show ip interface brief", table))
            .write(format!("{}\n", lo).as_bytes())
            .read(&reply(lo, "interface Loopback0\r\n ip address 192.168.255.1 255.255.255.255\r\nend"))
            .build();
        let mut session = session(mock).await;

        let records = ip_interfaces(&mut session).await.unwrap();
        let lines: Vec<String> = records.iter().map(ToString::to_string).collect();
        assert_eq!(lines, ["Serial0/0/0 - unknown/unknown", "Loopback0 - 192.168.255.1/32"]);
        assert!(matches!(records[0].issue, Some(ParseError::MalformedLine { .. })));

        session.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_ip_interfaces_aborts_on_channel_failure() {
        let mock = login(&mut Builder::new())
            .write(b"show ip interface brief\n")
            .read(b"show ip interface brief\r\nInterface   ")
            .build();
        let mut session = session(mock).await;

        let err = ip_interfaces(&mut session).await.unwrap_err();
        assert!(matches!(err, CommandError::Channel { .. }));

        session.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_serial_number() {
        let command = "show version | include Processor";
        let mock = login(&mut Builder::new())
            .write(format!("{}\n", command).as_bytes())
            .read(&reply(command, "Processor board ID FTX1234A5BC"))
            .build();
        let mut session = session(mock).await;

        let serial = serial_number(&mut session).await.unwrap();
        assert_eq!(serial.as_deref(), Some("FTX1234A5BC"));

        session.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_serial_number_missing() {
        let command = "show version | include Processor";
        let mock = login(&mut Builder::new())
            .write(format!("{}\n", command).as_bytes())
            .read(&reply(command, ""))
            .build();
        let mut session = session(mock).await;

        assert_eq!(serial_number(&mut session).await.unwrap(), None);

        session.disconnect().await.unwrap();
    }
}
