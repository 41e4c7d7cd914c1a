/// Outcome of a failed bus transaction
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// The chip did not acknowledge its address. It is either absent or busy with an internal write cycle
    AddressNack,

    /// The chip rejected a data byte
    DataNack,

    /// The transaction could not be completed for another reason
    Finish,

    /// The address phase of a read succeeded but no data was returned
    NoDataAvailable,
}

/// All possible errors emitted by the driver
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A transaction still failed after the configured number of attempts
    Bus(BusError),

    /// Address out of bound
    OutOfBounds,
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Error::Bus(e)
    }
}
