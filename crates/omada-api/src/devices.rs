// Device inventory
//
// Lists a site's devices and attaches port detail to every switch. The
// enrichment is all-or-nothing: the first failed port fetch discards the
// whole inventory.

use futures_util::{StreamExt, TryStreamExt, stream};
use tracing::debug;

use crate::client::OmadaClient;
use crate::error::Error;
use crate::models::Device;
use crate::ports::PortFetcher;

impl OmadaClient {
    /// List all devices of the site, switches enriched with their ports.
    ///
    /// `GET /{cid}/api/v2/sites/{siteId}/devices`, then one port call per
    /// switch.
    pub async fn get_devices(&self) -> Result<Vec<Device>, Error> {
        self.get_devices_with(self).await
    }

    /// Same as [`get_devices`](Self::get_devices) with ports taken from `ports`.
    pub async fn get_devices_with<P>(&self, ports: &P) -> Result<Vec<Device>, Error>
    where
        P: PortFetcher + Sync + ?Sized,
    {
        self.ensure_session().await?;

        let url = self.site_url(&["devices"]).await?;
        debug!("listing devices");
        let devices: Vec<Device> = self.get(url).await?;
        debug!(count = devices.len(), "received devices");

        enrich_switches(devices, ports, self.port_concurrency()).await
    }
}

/// Replace the port list of every switch with the fetcher's answer.
///
/// At most `concurrency` fetches run at once (`1` is strictly sequential);
/// output order matches input order. The first error drops every pending
/// fetch and is returned wrapped in [`Error::PortFetch`].
pub async fn enrich_switches<P>(
    devices: Vec<Device>,
    ports: &P,
    concurrency: usize,
) -> Result<Vec<Device>, Error>
where
    P: PortFetcher + Sync + ?Sized,
{
    stream::iter(devices)
        .map(|mut device| async move {
            if device.is_switch() {
                device.ports = ports
                    .fetch_ports(&device.mac)
                    .await
                    .map_err(|e| Error::PortFetch {
                        mac: device.mac.clone(),
                        source: Box::new(e),
                    })?;
                debug!(mac = %device.mac, ports = device.ports.len(), "enriched switch");
            }
            Ok::<_, Error>(device)
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::Port;

    /// Fake port source recording every MAC it is asked for.
    #[derive(Default)]
    struct FakePorts {
        ports: HashMap<String, Vec<Port>>,
        fail_on: Option<String>,
        calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        delay_ms: HashMap<String, u64>,
    }

    impl FakePorts {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PortFetcher for FakePorts {
        async fn fetch_ports(&self, mac: &str) -> Result<Vec<Port>, Error> {
            self.calls.lock().unwrap().push(mac.to_owned());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if let Some(ms) = self.delay_ms.get(mac) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_on.as_deref() == Some(mac) {
                return Err(Error::Http {
                    status: 500,
                    message: "boom".into(),
                });
            }
            Ok(self.ports.get(mac).cloned().unwrap_or_default())
        }
    }

    fn device(name: &str, device_type: &str, mac: &str) -> Device {
        Device {
            name: name.into(),
            device_type: device_type.into(),
            mac: mac.into(),
            ..Device::default()
        }
    }

    fn port(n: i64) -> Port {
        Port {
            port: n,
            name: format!("Port{n}"),
            ..Port::default()
        }
    }

    #[tokio::test]
    async fn no_switches_means_no_port_calls() {
        let fake = FakePorts::default();
        let devices = vec![device("ap1", "ap", "CC:DD"), device("gw", "gateway", "EE:FF")];

        let out = enrich_switches(devices.clone(), &fake, 1).await.unwrap();

        assert_eq!(out, devices);
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn switches_get_their_own_ports() {
        let fake = FakePorts {
            ports: HashMap::from([
                ("AA:BB".to_owned(), vec![port(1)]),
                ("11:22".to_owned(), vec![port(1), port(2)]),
            ]),
            ..FakePorts::default()
        };
        let devices = vec![
            device("sw1", "switch", "AA:BB"),
            device("ap1", "ap", "CC:DD"),
            device("sw2", "switch", "11:22"),
        ];

        let out = enrich_switches(devices, &fake, 1).await.unwrap();

        assert_eq!(fake.calls(), vec!["AA:BB", "11:22"]);
        assert_eq!(out[0].ports, vec![port(1)]);
        assert!(out[1].ports.is_empty());
        assert_eq!(out[2].ports, vec![port(1), port(2)]);
    }

    #[tokio::test]
    async fn mixed_case_type_is_not_a_switch() {
        let fake = FakePorts::default();
        let devices = vec![device("sw", "Switch", "AA:BB"), device("sw", "SWITCH", "CC:DD")];

        let out = enrich_switches(devices, &fake, 1).await.unwrap();

        assert!(fake.calls().is_empty());
        assert!(out.iter().all(|d| d.ports.is_empty()));
    }

    #[tokio::test]
    async fn second_failure_aborts_and_skips_the_rest() {
        let fake = FakePorts {
            fail_on: Some("S2".into()),
            ..FakePorts::default()
        };
        let devices = vec![
            device("sw1", "switch", "S1"),
            device("sw2", "switch", "S2"),
            device("sw3", "switch", "S3"),
        ];

        let err = enrich_switches(devices, &fake, 1).await.unwrap_err();

        assert!(matches!(err, Error::PortFetch { ref mac, .. } if mac == "S2"));
        assert_eq!(fake.calls(), vec!["S1", "S2"]);
    }

    #[tokio::test]
    async fn sequential_mode_never_overlaps() {
        let fake = FakePorts {
            delay_ms: HashMap::from([("S1".to_owned(), 5), ("S2".to_owned(), 5)]),
            ..FakePorts::default()
        };
        let devices = vec![device("sw1", "switch", "S1"), device("sw2", "switch", "S2")];

        enrich_switches(devices, &fake, 1).await.unwrap();

        assert_eq!(fake.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn parallel_mode_keeps_device_order() {
        let fake = FakePorts {
            ports: HashMap::from([
                ("S1".to_owned(), vec![port(1)]),
                ("S2".to_owned(), vec![port(2)]),
                ("S3".to_owned(), vec![port(3)]),
            ]),
            delay_ms: HashMap::from([
                ("S1".to_owned(), 30),
                ("S2".to_owned(), 20),
                ("S3".to_owned(), 10),
            ]),
            ..FakePorts::default()
        };
        let devices = vec![
            device("sw1", "switch", "S1"),
            device("ap", "ap", "A1"),
            device("sw2", "switch", "S2"),
            device("sw3", "switch", "S3"),
        ];

        let out = enrich_switches(devices, &fake, 4).await.unwrap();

        let names: Vec<_> = out.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["sw1", "ap", "sw2", "sw3"]);
        assert_eq!(out[0].ports, vec![port(1)]);
        assert_eq!(out[2].ports, vec![port(2)]);
        assert_eq!(out[3].ports, vec![port(3)]);
        assert!(fake.max_in_flight.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test(start_paused = true)]
    async fn parallel_mode_is_still_all_or_nothing() {
        let fake = FakePorts {
            fail_on: Some("S3".into()),
            delay_ms: HashMap::from([("S1".to_owned(), 50)]),
            ..FakePorts::default()
        };
        let devices = vec![
            device("sw1", "switch", "S1"),
            device("sw2", "switch", "S2"),
            device("sw3", "switch", "S3"),
        ];

        let err = enrich_switches(devices, &fake, 3).await.unwrap_err();

        assert!(matches!(err, Error::PortFetch { ref mac, .. } if mac == "S3"));
    }
}
