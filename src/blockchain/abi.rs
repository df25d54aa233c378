//! Flight and ticket contract interfaces.
//!
//! The contracts themselves are deployed from externally supplied bytecode;
//! only their call surface is described here.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolValue;

use crate::blockchain::types::{BlockchainError, BlockchainResult, ReceiptLog};

sol! {
    /// Flight contract, one per scheduled flight.
    #[derive(Debug, PartialEq, Eq)]
    interface IFlight {
        function flightNumber() external view returns (string memory);
        function flightStatus() external view returns (uint8);
        function flightStatusUpdateTime() external view returns (uint256);
        function flightTime() external view returns (uint256);
        function model() external view returns (string memory);
        function seats(uint8 category) external view returns (uint256);
        function getTicketFromID(string confirmationId) external view returns (address);
        function bookSeat(uint8 category) external payable;
    }

    /// Ticket contract, created by the flight contract on every booking.
    #[derive(Debug, PartialEq, Eq)]
    interface ITicket {
        function cancelled() external view returns (bool);
        function seatCategory() external view returns (uint8);
        function cancel() external;
        function claim() external;
        function collectMoney() external;
    }
}

/// Creation payload: bytecode followed by the encoded constructor arguments
/// `(string flNum, uint256 flTime, string flModel)`.
pub fn deployment_input(
    bytecode: &[u8],
    flight_number: &str,
    scheduled_time: u64,
    model: &str,
) -> Bytes {
    let args = (
        flight_number.to_string(),
        U256::from(scheduled_time),
        model.to_string(),
    )
        .abi_encode_params();

    let mut input = Vec::with_capacity(bytecode.len() + args.len());
    input.extend_from_slice(bytecode);
    input.extend_from_slice(&args);
    input.into()
}

/// Confirmation id and ticket contract announced by the first log of a
/// booking receipt.
pub fn decode_booking_log(logs: &[ReceiptLog]) -> BlockchainResult<(String, Address)> {
    let log = logs
        .first()
        .ok_or_else(|| BlockchainError::MissingEvent("booking receipt has no logs".to_string()))?;

    let (confirmation_id,) = <(String,)>::abi_decode_params(&log.data)
        .map_err(|e| BlockchainError::Abi(format!("booking log: {}", e)))?;

    Ok((confirmation_id, log.address))
}
