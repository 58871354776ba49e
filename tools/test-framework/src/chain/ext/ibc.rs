use core::str::FromStr;

use ibc_proto::ibc::core::client::v1::query_client::QueryClient;
use ibc_proto::ibc::core::client::v1::QueryClientStatusRequest;
use ibc_relayer_types::core::ics24_host::identifier::ClientId;
use tracing::debug;

use crate::chain::cli::ibc::{
    query_channels, query_connections, IdentifiedChannel, IdentifiedConnection,
};
use crate::chain::driver::ChainDriver;
use crate::error::{handle_generic_error, Error};
use crate::types::client::ClientStatus;

/**
   Queries on the IBC state of a chain.
*/
pub trait ChainIbcMethodsExt {
    fn query_connections(&self) -> Result<Vec<IdentifiedConnection>, Error>;

    fn query_channels(&self) -> Result<Vec<IdentifiedChannel>, Error>;

    /**
       Query the status of a light client hosted on this chain through
       the `ibc.core.client.v1.Query/ClientStatus` gRPC endpoint.
    */
    fn query_client_status(&self, client_id: &ClientId) -> Result<ClientStatus, Error>;
}

impl ChainIbcMethodsExt for ChainDriver {
    fn query_connections(&self) -> Result<Vec<IdentifiedConnection>, Error> {
        query_connections(self)
    }

    fn query_channels(&self) -> Result<Vec<IdentifiedChannel>, Error> {
        query_channels(self)
    }

    fn query_client_status(&self, client_id: &ClientId) -> Result<ClientStatus, Error> {
        let grpc_address = self.grpc_address();

        let status = self.runtime.block_on(async {
            let mut client = QueryClient::connect(grpc_address)
                .await
                .map_err(handle_generic_error)?;

            let response = client
                .client_status(QueryClientStatusRequest {
                    client_id: client_id.to_string(),
                })
                .await
                .map_err(handle_generic_error)?;

            Ok::<_, Error>(response.into_inner().status)
        })?;

        debug!(
            "client {} on chain {} has status {}",
            client_id, self.chain_id, status
        );

        ClientStatus::from_str(&status)
    }
}
