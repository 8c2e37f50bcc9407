//! Dependency wiring for the relay server.

use std::sync::Arc;

use agora_shared::time::Clock;

use crate::{
    config::RelayConfig,
    infrastructure::{
        message_pusher::RegistryMessagePusher, repository::InMemoryParticipantRegistry,
    },
    ui::Server,
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, ListParticipantsUseCase,
        MonitorLivenessUseCase, RelayMessageUseCase,
    },
};

/// Assemble a [`Server`] from its configuration and a clock
pub fn build_server(config: RelayConfig, clock: Arc<dyn Clock>) -> Server {
    // Initialize dependencies in order:
    // 1. Registry
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server

    // 1. Create Registry (in-memory)
    let registry = Arc::new(InMemoryParticipantRegistry::new(clock.clone()));

    // 2. Create MessagePusher (fans out over the registry's connections)
    let message_pusher = Arc::new(RegistryMessagePusher::new(registry.clone()));

    // 3. Create UseCases
    let connect_participant_usecase = Arc::new(ConnectParticipantUseCase::new(
        registry.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));
    let disconnect_participant_usecase = Arc::new(DisconnectParticipantUseCase::new(
        registry.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));
    let relay_message_usecase = Arc::new(RelayMessageUseCase::new(
        registry.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));
    let list_participants_usecase = Arc::new(ListParticipantsUseCase::new(registry.clone()));
    let monitor_liveness_usecase = Arc::new(MonitorLivenessUseCase::new(
        registry,
        message_pusher,
        clock,
        config.idle_window,
    ));

    // 4. Create the server
    Server::new(
        config,
        connect_participant_usecase,
        disconnect_participant_usecase,
        relay_message_usecase,
        list_participants_usecase,
        monitor_liveness_usecase,
    )
}
