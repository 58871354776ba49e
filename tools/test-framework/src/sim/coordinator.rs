/*!
   The coordinator owns a set of simulated chains sharing one clock, and
   plays the relayer between them: it creates clients, runs the
   connection and channel handshakes, and relays packets along a
   [`Path`].

   Every relayed message is delivered atomically on its chain, followed
   by a block commit and a clock increment, the same way a transaction
   sent by an [`Account`](crate::sim::account::Account) is.
*/

use core::time::Duration;
use cosmwasm_std::{IbcPacket, Timestamp};
use eyre::eyre;
use ibc_relayer_types::core::ics24_host::identifier::{ChainId, ChannelId, ClientId, PortId};
use tracing::{debug, info};

use crate::error::Error;
use crate::sim::chain::{SimChain, TxResult};
use crate::sim::clock::MockClock;
use crate::sim::ibc::{ChannelState, ConnectionState};
use crate::sim::path::{Path, Side};

/// How far the clock moves after every committed transaction.
pub const TIME_INCREMENT: Duration = Duration::from_secs(5);

pub const CHAIN_ID_PREFIX: &str = "testchain";

pub struct Coordinator {
    clock: MockClock,
    chains: Vec<SimChain>,
}

impl Coordinator {
    /// Create `chain_count` chains named `testchain0`, `testchain1`, ...
    pub fn new(chain_count: usize) -> Result<Self, Error> {
        let clock = MockClock::default();

        let chains = (0..chain_count)
            .map(|index| {
                SimChain::new(
                    ChainId::from_string(&format!("{CHAIN_ID_PREFIX}{index}")),
                    clock.clone(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { clock, chains })
    }

    pub fn clock(&self) -> &MockClock {
        &self.clock
    }

    pub fn now(&self) -> Result<Timestamp, Error> {
        self.clock.now()
    }

    pub fn chain_ids(&self) -> Vec<ChainId> {
        self.chains
            .iter()
            .map(|chain| chain.chain_id().clone())
            .collect()
    }

    /// The id of the chain created at position `index`.
    pub fn chain_id(&self, index: usize) -> Result<ChainId, Error> {
        self.chains
            .get(index)
            .map(|chain| chain.chain_id().clone())
            .ok_or_else(|| Error::unknown_chain(format!("{CHAIN_ID_PREFIX}{index}")))
    }

    fn index_of(&self, chain_id: &ChainId) -> Result<usize, Error> {
        self.chains
            .iter()
            .position(|chain| chain.chain_id() == chain_id)
            .ok_or_else(|| Error::unknown_chain(chain_id.to_string()))
    }

    pub fn chain(&self, chain_id: &ChainId) -> Result<&SimChain, Error> {
        let index = self.index_of(chain_id)?;
        Ok(&self.chains[index])
    }

    pub fn chain_mut(&mut self, chain_id: &ChainId) -> Result<&mut SimChain, Error> {
        let index = self.index_of(chain_id)?;
        Ok(&mut self.chains[index])
    }

    /// Bring the block time of every chain up to the shared clock.
    pub fn update_time(&mut self) -> Result<(), Error> {
        for chain in self.chains.iter_mut() {
            chain.update_time()?;
        }

        Ok(())
    }

    pub fn increment_time(&mut self) -> Result<(), Error> {
        self.increment_time_by(TIME_INCREMENT)
    }

    pub fn increment_time_by(&mut self, duration: Duration) -> Result<(), Error> {
        self.clock.increment(duration)?;
        self.update_time()
    }

    /// Produce `count` empty blocks on a chain, moving the clock after each.
    pub fn commit_blocks(&mut self, chain_id: &ChainId, count: u64) -> Result<(), Error> {
        for _ in 0..count {
            self.chain_mut(chain_id)?.next_block()?;
            self.increment_time()?;
        }

        Ok(())
    }

    /**
       Deliver a relayer message on a chain. The message either applies
       completely or not at all; on success a block is committed and the
       clock moves forward.
    */
    fn relay_tx<T>(
        &mut self,
        chain_id: &ChainId,
        f: impl FnOnce(&mut SimChain) -> Result<T, Error>,
    ) -> Result<T, Error> {
        self.update_time()?;

        let chain = self.chain_mut(chain_id)?;
        let output = chain.atomically(f)?;
        chain.next_block()?;

        self.increment_time()?;

        Ok(output)
    }

    /// Like `relay_tx`, queueing the packets the contract sent in response.
    fn relay_msg(
        &mut self,
        chain_id: &ChainId,
        f: impl FnOnce(&mut SimChain) -> Result<TxResult, Error>,
    ) -> Result<TxResult, Error> {
        let result = self.relay_tx(chain_id, f)?;
        self.chain_mut(chain_id)?.capture_ibc_events(&result);
        Ok(result)
    }

    /// Update the client on `host` with the latest state of `counterparty`.
    fn update_client(
        &mut self,
        host: &ChainId,
        client_id: &ClientId,
        counterparty: &ChainId,
    ) -> Result<(), Error> {
        self.update_time()?;

        let counterparty_chain = self.chain(counterparty)?;
        let height = counterparty_chain.height();
        let timestamp = counterparty_chain.block_time();

        self.relay_tx(host, |chain| chain.update_client(client_id, height, timestamp))
    }

    fn expect_channel_state(
        &self,
        chain_id: &ChainId,
        port_id: &PortId,
        channel_id: &ChannelId,
        expected: ChannelState,
    ) -> Result<(), Error> {
        let state = self.chain(chain_id)?.channel(port_id, channel_id)?.state;

        if state != expected {
            return Err(Error::generic(eyre!(
                "expected channel {}/{} on chain {} to be {:?}, found {:?}",
                port_id,
                channel_id,
                chain_id,
                expected,
                state
            )));
        }

        Ok(())
    }

    /// Create clients, open a connection and open a channel between the
    /// two endpoints of the path.
    pub fn setup(&mut self, path: &mut Path) -> Result<(), Error> {
        self.setup_clients(path)?;
        self.setup_connections(path)?;
        self.create_channels(path)?;

        info!(
            "opened channel {}/{} <-> {}/{} between {} and {}",
            path.endpoint_a.port_id(),
            path.endpoint_a.channel_id()?,
            path.endpoint_b.port_id(),
            path.endpoint_b.channel_id()?,
            path.endpoint_a.chain_id,
            path.endpoint_b.chain_id,
        );

        Ok(())
    }

    pub fn setup_clients(&mut self, path: &mut Path) -> Result<(), Error> {
        for side in [Side::A, Side::B] {
            let host = path.endpoint(side).chain_id.clone();
            let counterparty = path.endpoint(side.counterparty()).chain_id.clone();
            let trusting_period = path.endpoint(side).client_config.trusting_period;

            self.update_time()?;

            let counterparty_chain = self.chain(&counterparty)?;
            let height = counterparty_chain.height();
            let timestamp = counterparty_chain.block_time();

            let client_id = self.relay_tx(&host, |chain| {
                chain.create_client(&counterparty, height, timestamp, trusting_period)
            })?;

            path.endpoint_mut(side).client_id = Some(client_id);
        }

        Ok(())
    }

    pub fn setup_connections(&mut self, path: &mut Path) -> Result<(), Error> {
        let chain_a = path.endpoint_a.chain_id.clone();
        let chain_b = path.endpoint_b.chain_id.clone();
        let client_a = path.endpoint_a.client_id()?.clone();
        let client_b = path.endpoint_b.client_id()?.clone();

        let connection_a =
            self.relay_tx(&chain_a, |chain| chain.conn_open_init(&client_a, &client_b))?;
        path.endpoint_a.connection_id = Some(connection_a.clone());

        self.update_client(&chain_b, &client_b, &chain_a)?;

        let connection_b = self.relay_tx(&chain_b, |chain| {
            chain.conn_open_try(&client_b, &client_a, &connection_a)
        })?;
        path.endpoint_b.connection_id = Some(connection_b.clone());

        self.update_client(&chain_a, &client_a, &chain_b)?;

        self.relay_tx(&chain_a, |chain| {
            chain.conn_open_ack(&connection_a, &connection_b)
        })?;

        self.update_client(&chain_b, &client_b, &chain_a)?;

        self.relay_tx(&chain_b, |chain| chain.conn_open_confirm(&connection_b))?;

        let state_a = self.chain(&chain_a)?.connection(&connection_a)?.state;
        if state_a != ConnectionState::Open {
            return Err(Error::connection_not_open(
                chain_a.to_string(),
                connection_a.to_string(),
            ));
        }

        debug!(
            "opened connection {} <-> {} between {} and {}",
            connection_a, connection_b, chain_a, chain_b
        );

        Ok(())
    }

    /**
       Run the four step channel handshake, calling the contracts bound to
       the endpoint ports. Either contract may reject the channel, in
       which case the handshake stops with the contract's error.
    */
    pub fn create_channels(&mut self, path: &mut Path) -> Result<(), Error> {
        let chain_a = path.endpoint_a.chain_id.clone();
        let chain_b = path.endpoint_b.chain_id.clone();
        let client_a = path.endpoint_a.client_id()?.clone();
        let client_b = path.endpoint_b.client_id()?.clone();
        let connection_a = path.endpoint_a.connection_id()?.clone();
        let connection_b = path.endpoint_b.connection_id()?.clone();
        let config_a = path.endpoint_a.channel_config.clone();
        let config_b = path.endpoint_b.channel_config.clone();

        let channel_a = self.relay_tx(&chain_a, |chain| {
            chain.chan_open_init(
                &config_a.port_id,
                &connection_a,
                &config_b.port_id,
                config_a.order.clone(),
                &config_a.version,
            )
        })?;
        path.endpoint_a.channel_id = Some(channel_a.clone());

        self.update_client(&chain_b, &client_b, &chain_a)?;
        self.expect_channel_state(&chain_a, &config_a.port_id, &channel_a, ChannelState::Init)?;

        let version_a = self
            .chain(&chain_a)?
            .channel(&config_a.port_id, &channel_a)?
            .version
            .clone();

        let channel_b = self.relay_tx(&chain_b, |chain| {
            chain.chan_open_try(
                &config_b.port_id,
                &connection_b,
                &config_a.port_id,
                &channel_a,
                config_b.order.clone(),
                &config_b.version,
                &version_a,
            )
        })?;
        path.endpoint_b.channel_id = Some(channel_b.clone());

        self.update_client(&chain_a, &client_a, &chain_b)?;
        self.expect_channel_state(&chain_b, &config_b.port_id, &channel_b, ChannelState::TryOpen)?;

        let version_b = self
            .chain(&chain_b)?
            .channel(&config_b.port_id, &channel_b)?
            .version
            .clone();

        self.relay_msg(&chain_a, |chain| {
            chain.chan_open_ack(&config_a.port_id, &channel_a, &channel_b, &version_b)
        })?;

        self.update_client(&chain_b, &client_b, &chain_a)?;
        self.expect_channel_state(&chain_a, &config_a.port_id, &channel_a, ChannelState::Open)?;

        self.relay_msg(&chain_b, |chain| {
            chain.chan_open_confirm(&config_b.port_id, &channel_b)
        })?;

        Ok(())
    }

    /// Packets queued on the `side` end of the path that were sent over its channel.
    fn pending_packets_on(&self, path: &Path, side: Side) -> Result<Vec<IbcPacket>, Error> {
        let endpoint = path.endpoint(side);
        let port_id = endpoint.port_id().as_str();
        let channel_id = endpoint.channel_id()?.as_str();

        Ok(self
            .chain(&endpoint.chain_id)?
            .pending_packets()
            .iter()
            .filter(|packet| packet.src.port_id == port_id && packet.src.channel_id == channel_id)
            .cloned()
            .collect())
    }

    /**
       Relay every packet waiting on either end of the path and relay the
       acknowledgements back. Stops at the first packet that cannot be
       delivered, e.g. because a client expired or the packet timed out.
    */
    pub fn relay_and_ack_pending_packets(&mut self, path: &Path) -> Result<(), Error> {
        for side in [Side::A, Side::B] {
            for packet in self.pending_packets_on(path, side)? {
                self.relay_packet(path, side, &packet)?;

                self.chain_mut(&path.endpoint(side).chain_id)?
                    .remove_pending_packet(&packet);
            }
        }

        Ok(())
    }

    fn relay_packet(&mut self, path: &Path, side: Side, packet: &IbcPacket) -> Result<(), Error> {
        let source = path.endpoint(side);
        let destination = path.endpoint(side.counterparty());

        let (port_id, channel_id) = packet_destination(packet)?;

        // A packet received by an earlier, partially failed relay only
        // needs its stored acknowledgement delivered.
        let stored_acknowledgement = self
            .chain(&destination.chain_id)?
            .packet_acknowledgement(&port_id, &channel_id, packet.sequence)
            .cloned();

        let acknowledgement = match stored_acknowledgement {
            Some(acknowledgement) => {
                debug!(
                    "packet {} was already received on {}, relaying its acknowledgement",
                    packet.sequence, destination.chain_id
                );

                acknowledgement
            }
            None => {
                self.update_client(
                    &destination.chain_id,
                    destination.client_id()?,
                    &source.chain_id,
                )?;

                let (acknowledgement, result) =
                    self.relay_tx(&destination.chain_id, |chain| chain.recv_packet(packet))?;

                self.chain_mut(&destination.chain_id)?
                    .capture_ibc_events(&result);

                acknowledgement
            }
        };

        self.update_client(&source.chain_id, source.client_id()?, &destination.chain_id)?;

        self.relay_msg(&source.chain_id, |chain| {
            chain.acknowledge_packet(packet, &acknowledgement)
        })?;

        debug!(
            "relayed packet {} from {} to {}",
            packet.sequence, source.chain_id, destination.chain_id
        );

        Ok(())
    }

    /**
       Time out the waiting packets whose timeout has passed on the
       destination without being received there. Packets that have not
       timed out yet are left in the queue.
    */
    pub fn timeout_pending_packets(&mut self, path: &Path) -> Result<(), Error> {
        self.update_time()?;

        for side in [Side::A, Side::B] {
            let source = path.endpoint(side);
            let destination = path.endpoint(side.counterparty());

            for packet in self.pending_packets_on(path, side)? {
                let destination_chain = self.chain(&destination.chain_id)?;
                let (port_id, channel_id) = packet_destination(&packet)?;

                if destination_chain.has_packet_receipt(&port_id, &channel_id, packet.sequence) {
                    continue;
                }

                let timed_out_by_time = packet
                    .timeout
                    .timestamp()
                    .map_or(false, |timestamp| destination_chain.block_time() >= timestamp);

                let timed_out_by_height = packet
                    .timeout
                    .block()
                    .map_or(false, |block| destination_chain.height() >= block.height);

                if !timed_out_by_time && !timed_out_by_height {
                    continue;
                }

                // The source client only moves forward on a new destination
                // height, so commit one at the time the timeout was observed.
                self.chain_mut(&destination.chain_id)?.next_block()?;

                self.update_client(&source.chain_id, source.client_id()?, &destination.chain_id)?;

                self.relay_msg(&source.chain_id, |chain| chain.timeout_packet(&packet))?;

                self.chain_mut(&source.chain_id)?
                    .remove_pending_packet(&packet);

                info!(
                    "timed out packet {} sent from {} to {}",
                    packet.sequence, source.chain_id, destination.chain_id
                );
            }
        }

        Ok(())
    }

    /// Refresh both clients of the path. Fails when a client has expired.
    pub fn update_clients(&mut self, path: &Path) -> Result<(), Error> {
        self.update_client(
            &path.endpoint_b.chain_id,
            path.endpoint_b.client_id()?,
            &path.endpoint_a.chain_id,
        )?;

        self.update_client(
            &path.endpoint_a.chain_id,
            path.endpoint_a.client_id()?,
            &path.endpoint_b.chain_id,
        )
    }

    /// Close the channel from the `side` end, then confirm the closure on
    /// the other end.
    pub fn close_channel(&mut self, path: &Path, side: Side) -> Result<(), Error> {
        let endpoint = path.endpoint(side);
        let counterparty = path.endpoint(side.counterparty());

        let channel_id = endpoint.channel_id()?;
        let counterparty_channel_id = counterparty.channel_id()?;

        self.relay_msg(&endpoint.chain_id, |chain| {
            chain.chan_close_init(endpoint.port_id(), channel_id)
        })?;

        self.update_client(
            &counterparty.chain_id,
            counterparty.client_id()?,
            &endpoint.chain_id,
        )?;

        self.expect_channel_state(
            &endpoint.chain_id,
            endpoint.port_id(),
            channel_id,
            ChannelState::Closed,
        )?;

        self.relay_msg(&counterparty.chain_id, |chain| {
            chain.chan_close_confirm(counterparty.port_id(), counterparty_channel_id)
        })?;

        Ok(())
    }
}

fn packet_destination(packet: &IbcPacket) -> Result<(PortId, ChannelId), Error> {
    let port_id: PortId = packet
        .dest
        .port_id
        .parse()
        .map_err(|e| eyre!("invalid port id: {}", e))?;

    let channel_id: ChannelId = packet
        .dest
        .channel_id
        .parse()
        .map_err(|e| eyre!("invalid channel id: {}", e))?;

    Ok((port_id, channel_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cw_ibc_example::msg::{GetCountResponse, QueryMsg};

    use crate::sim::account::Account;
    use crate::sim::helpers::{channel_config, counter_contract, instantiate};
    use crate::types::client::ClientStatus;

    struct Fixture {
        coordinator: Coordinator,
        path: Path,
        contract_a: String,
        contract_b: String,
    }

    fn fixture() -> Result<Fixture, Error> {
        let mut coordinator = Coordinator::new(2)?;
        let chain_a = coordinator.chain_id(0)?;
        let chain_b = coordinator.chain_id(1)?;

        let chain = coordinator.chain_mut(&chain_a)?;
        let code_id = chain.store_code(counter_contract());
        let contract_a = instantiate(chain, code_id)?;
        let port_a = chain.contract_port(&contract_a)?;

        let chain = coordinator.chain_mut(&chain_b)?;
        let code_id = chain.store_code(counter_contract());
        let contract_b = instantiate(chain, code_id)?;
        let port_b = chain.contract_port(&contract_b)?;

        let mut path = Path::new(&chain_a, &chain_b);
        path.endpoint_a.channel_config = channel_config(&port_a);
        path.endpoint_b.channel_config = channel_config(&port_b);

        coordinator.setup(&mut path)?;

        Ok(Fixture {
            coordinator,
            path,
            contract_a,
            contract_b,
        })
    }

    #[test]
    fn chains_are_named_after_their_index() -> Result<(), Error> {
        let coordinator = Coordinator::new(3)?;

        assert_eq!(
            coordinator
                .chain_ids()
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>(),
            vec!["testchain0", "testchain1", "testchain2"]
        );
        assert!(coordinator.chain_id(3).is_err());

        Ok(())
    }

    #[test]
    fn setup_opens_both_channel_ends() -> Result<(), Error> {
        let fixture = fixture()?;
        let path = &fixture.path;

        for side in [Side::A, Side::B] {
            let endpoint = path.endpoint(side);
            let chain = fixture.coordinator.chain(&endpoint.chain_id)?;

            let channel = chain.channel(endpoint.port_id(), endpoint.channel_id()?)?;
            assert_eq!(channel.state, ChannelState::Open);
            assert_eq!(channel.version, "counter-1");

            let connection = chain.connection(endpoint.connection_id()?)?;
            assert_eq!(connection.state, ConnectionState::Open);

            assert_eq!(
                chain.client_status(endpoint.client_id()?)?,
                ClientStatus::Active
            );
        }

        Ok(())
    }

    #[test]
    fn relayed_packet_is_acknowledged() -> Result<(), Error> {
        let mut fixture = fixture()?;
        let chain_a = fixture.path.endpoint_a.chain_id.clone();
        let chain_b = fixture.path.endpoint_b.chain_id.clone();
        let channel_a = fixture.path.endpoint_a.channel_id()?.to_string();
        let channel_b = fixture.path.endpoint_b.channel_id()?.to_string();

        let mut account = Account::generate(fixture.coordinator.chain_mut(&chain_a)?)?;
        account.execute_increment(&mut fixture.coordinator, &fixture.contract_a, &channel_a)?;

        assert_eq!(
            fixture.coordinator.chain(&chain_a)?.pending_packets().len(),
            1
        );

        fixture
            .coordinator
            .relay_and_ack_pending_packets(&fixture.path)?;

        let chain = fixture.coordinator.chain(&chain_a)?;
        assert!(chain.pending_packets().is_empty());
        assert!(chain
            .packet_commitment(
                fixture.path.endpoint_a.port_id(),
                fixture.path.endpoint_a.channel_id()?,
                1
            )
            .is_none());

        let count: GetCountResponse = fixture.coordinator.chain(&chain_b)?.query_smart(
            &fixture.contract_b,
            &QueryMsg::GetCount { channel: channel_b },
        )?;
        assert_eq!(count.count, 1);

        Ok(())
    }

    #[test]
    fn packet_received_earlier_is_acknowledged_once() -> Result<(), Error> {
        let mut fixture = fixture()?;
        let chain_a = fixture.path.endpoint_a.chain_id.clone();
        let chain_b = fixture.path.endpoint_b.chain_id.clone();
        let channel_a = fixture.path.endpoint_a.channel_id()?.to_string();
        let channel_b = fixture.path.endpoint_b.channel_id()?.to_string();

        let mut account = Account::generate(fixture.coordinator.chain_mut(&chain_a)?)?;
        account.execute_increment(&mut fixture.coordinator, &fixture.contract_a, &channel_a)?;

        // Delivered on B, but the acknowledgement never made it back to A.
        let packet = fixture.coordinator.chain(&chain_a)?.pending_packets()[0].clone();
        fixture.coordinator.chain_mut(&chain_b)?.recv_packet(&packet)?;

        fixture
            .coordinator
            .relay_and_ack_pending_packets(&fixture.path)?;

        let chain = fixture.coordinator.chain(&chain_a)?;
        assert!(chain.pending_packets().is_empty());
        assert!(chain
            .packet_commitment(
                fixture.path.endpoint_a.port_id(),
                fixture.path.endpoint_a.channel_id()?,
                1
            )
            .is_none());

        let count: GetCountResponse = fixture.coordinator.chain(&chain_b)?.query_smart(
            &fixture.contract_b,
            &QueryMsg::GetCount { channel: channel_b },
        )?;
        assert_eq!(count.count, 1);

        Ok(())
    }

    #[test]
    fn commit_blocks_moves_height_and_time() -> Result<(), Error> {
        let mut coordinator = Coordinator::new(1)?;
        let chain_id = coordinator.chain_id(0)?;

        let height = coordinator.chain(&chain_id)?.height();
        let time = coordinator.now()?;

        coordinator.commit_blocks(&chain_id, 3)?;

        assert_eq!(coordinator.chain(&chain_id)?.height(), height + 3);
        assert_eq!(coordinator.now()?, time.plus_seconds(15));

        Ok(())
    }
}
