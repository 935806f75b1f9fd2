//! Minimum node service
//!
//! Covers the identity side of a node: answering node-number and parameter
//! queries, accepting a node number in setup mode and switching modes on
//! request. Service discovery (RQSD) is answered by the controller and is
//! never seen here.

use crate::node::{Mode, ModuleParameters};
use crate::service::{ProcessResult, Service, ServiceContext};
use vlcbkit_core::{modes, opcodes, params, responses, ServiceId, VlcbFrame};

/// Minimum node service (id 1).
#[derive(Debug, Default)]
pub struct MinimumNodeService;

impl MinimumNodeService {
    pub const VERSION: u8 = 1;

    pub fn new() -> Self {
        Self
    }

    fn addressed(frame: &VlcbFrame, ctx: &ServiceContext<'_>) -> bool {
        frame
            .node_number()
            .is_some_and(|nn| ctx.identity().is_addressed(nn))
    }

    /// Node number from the zero-filled data bytes, even in a short frame
    fn target(frame: &VlcbFrame) -> u16 {
        u16::from_be_bytes([frame.data()[0], frame.data()[1]])
    }

    fn query_node_number(&self, ctx: &mut ServiceContext<'_>) -> ProcessResult {
        if ctx.identity().node_number == 0 {
            return ProcessResult::Handled;
        }
        let mode = ctx.identity().mode;
        let parameters = ctx.parameters();
        let body = [
            parameters.manufacturer_id,
            parameters.module_id,
            parameters.flags(mode),
        ];
        ctx.send_with_node_number(opcodes::PNN, &body);
        ProcessResult::Handled
    }

    fn request_parameters(&self, ctx: &mut ServiceContext<'_>) -> ProcessResult {
        if ctx.identity().mode != Mode::Setup {
            return ProcessResult::NotHandled;
        }
        let block = ctx.parameters().params_block();
        ctx.send_built(VlcbFrame::new(opcodes::PARAMS, &block));
        ProcessResult::Handled
    }

    fn request_parameter(&self, frame: &VlcbFrame, ctx: &mut ServiceContext<'_>) -> ProcessResult {
        if !ctx.identity().is_addressed(Self::target(frame)) {
            return ProcessResult::NotHandled;
        }
        if frame.len() < 4 {
            ctx.send_grsp(opcodes::RQNPN, self.id(), responses::CMDERR_INV_CMD);
            return ProcessResult::Handled;
        }
        let index = frame.data()[2];
        let mode = ctx.identity().mode;

        if index == params::PAR_NUM {
            let parameters = ctx.parameters().clone();
            for i in 0..=ModuleParameters::COUNT {
                if let Some(value) = parameters.get(i, mode) {
                    ctx.send_with_node_number(opcodes::PARAN, &[i, value]);
                }
            }
            return ProcessResult::Handled;
        }

        match ctx.parameters().get(index, mode) {
            Some(value) => {
                ctx.send_with_node_number(opcodes::PARAN, &[index, value]);
            }
            None => {
                ctx.send_cmderr(responses::CMDERR_INV_PARAM_IDX);
                ctx.send_grsp(
                    opcodes::RQNPN,
                    self.id(),
                    responses::CMDERR_INV_PARAM_IDX,
                );
            }
        }
        ProcessResult::Handled
    }

    fn request_module_name(&self, ctx: &mut ServiceContext<'_>) -> ProcessResult {
        let mode = ctx.identity().mode;
        let learning = ctx.parameters().flags(mode) & params::PF_LRN != 0;
        if mode != Mode::Setup && !learning {
            return ProcessResult::NotHandled;
        }
        let name = ctx.parameters().name;
        ctx.send_built(VlcbFrame::new(opcodes::NAME, &name));
        ProcessResult::Handled
    }

    fn set_node_number(&self, frame: &VlcbFrame, ctx: &mut ServiceContext<'_>) -> ProcessResult {
        if ctx.identity().mode != Mode::Setup {
            return ProcessResult::NotHandled;
        }
        let Some(node_number) = frame.node_number() else {
            ctx.send_grsp(opcodes::SNN, self.id(), responses::CMDERR_INV_CMD);
            return ProcessResult::Handled;
        };
        ctx.identity_mut().set_normal(node_number);
        tracing::info!("Node number set to {}", node_number);
        ctx.send_with_node_number(opcodes::NNACK, &[]);
        ProcessResult::Handled
    }

    fn set_mode(&self, frame: &VlcbFrame, ctx: &mut ServiceContext<'_>) -> ProcessResult {
        if !ctx.identity().is_addressed(Self::target(frame)) {
            return ProcessResult::NotHandled;
        }
        if frame.len() < 4 {
            ctx.send_grsp(opcodes::MODE, self.id(), responses::CMDERR_INV_CMD);
            return ProcessResult::Handled;
        }
        let requested = frame.data()[2];
        let mode = ctx.identity().mode;

        match requested {
            modes::MODE_UNINITIALISED if mode == Mode::Setup => {
                ctx.send_grsp(opcodes::MODE, self.id(), responses::GRSP_OK);
                ctx.identity_mut().set_uninitialised();
                tracing::info!("Setup ended without a node number");
            }
            modes::MODE_UNINITIALISED => {
                ctx.send_grsp(opcodes::MODE, self.id(), responses::CMDERR_INV_CMD);
            }
            modes::MODE_SETUP if mode == Mode::Normal => {
                ctx.send_grsp(opcodes::MODE, self.id(), responses::GRSP_OK);
                ctx.send_with_node_number(opcodes::NNREL, &[]);
                self.start_setup(ctx);
            }
            modes::MODE_SETUP if mode == Mode::Uninitialised => {
                ctx.send_grsp(opcodes::MODE, self.id(), responses::GRSP_OK);
                self.start_setup(ctx);
            }
            modes::MODE_SETUP => {
                ctx.send_grsp(opcodes::MODE, self.id(), responses::GRSP_INVALID_MODE);
            }
            modes::MODE_NORMAL if mode == Mode::Normal => {
                ctx.send_grsp(opcodes::MODE, self.id(), responses::GRSP_OK);
            }
            modes::MODE_NORMAL => {
                ctx.send_grsp(opcodes::MODE, self.id(), responses::GRSP_INVALID_MODE);
            }
            modes::MODE_HEARTBEAT_ON | modes::MODE_HEARTBEAT_OFF => {
                ctx.identity_mut().heartbeat = requested == modes::MODE_HEARTBEAT_ON;
            }
            _ if mode != Mode::Normal => {
                ctx.send_grsp(opcodes::MODE, self.id(), responses::CMDERR_INV_CMD);
            }
            _ => tracing::debug!("Ignoring unknown mode {:#04X}", requested),
        }
        ProcessResult::Handled
    }

    fn start_setup(&self, ctx: &mut ServiceContext<'_>) {
        ctx.identity_mut().enter_setup();
        tracing::info!("Entering setup from node {}", ctx.identity().node_number);
        ctx.send_with_node_number(opcodes::RQNN, &[]);
    }

    fn node_number_request(&self, frame: &VlcbFrame, ctx: &mut ServiceContext<'_>) -> ProcessResult {
        // Another node entered setup.
        if ctx.identity().mode == Mode::Setup && !Self::addressed(frame, ctx) {
            ctx.identity_mut().abort_setup();
            tracing::info!("Setup abandoned: another node requested a node number");
            return ProcessResult::Handled;
        }
        ProcessResult::NotHandled
    }

    fn reset(&self, frame: &VlcbFrame, ctx: &mut ServiceContext<'_>) -> ProcessResult {
        if !Self::addressed(frame, ctx) {
            return ProcessResult::NotHandled;
        }
        if frame.opcode() == opcodes::NNRSM {
            tracing::warn!("Reset to manufacturer defaults requested");
        } else {
            tracing::warn!("Software reset requested");
        }
        ProcessResult::Handled
    }
}

impl Service for MinimumNodeService {
    fn id(&self) -> ServiceId {
        ServiceId::MinimumNode
    }

    fn version(&self) -> u8 {
        Self::VERSION
    }

    fn process(&mut self, frame: &VlcbFrame, ctx: &mut ServiceContext<'_>) -> ProcessResult {
        match frame.opcode() {
            opcodes::QNN => self.query_node_number(ctx),
            opcodes::RQNP => self.request_parameters(ctx),
            opcodes::RQNPN => self.request_parameter(frame, ctx),
            opcodes::RQMN => self.request_module_name(ctx),
            opcodes::SNN => self.set_node_number(frame, ctx),
            opcodes::MODE => self.set_mode(frame, ctx),
            opcodes::RQNN => self.node_number_request(frame, ctx),
            opcodes::NNRST | opcodes::NNRSM => self.reset(frame, ctx),
            _ => ProcessResult::NotHandled,
        }
    }

    /// ESD payload: current mode and heartbeat state
    fn report_service_data(&self, index: u8, ctx: &mut ServiceContext<'_>) {
        let identity = ctx.identity();
        let body = [
            index,
            self.id().code(),
            identity.mode.code(),
            u8::from(identity.heartbeat),
            0,
        ];
        ctx.send_with_node_number(opcodes::ESD, &body);
    }
}
