use {
    crate::{
        Instruction, UsageError,
        checksum::Checksum,
        constants::{HEADER, INSTRUCTION_BASE_LENGTH, InstructionSet},
    },
    alloc::vec::Vec,
};

/// Frame `parameters` as an instruction packet and append its checksum.
///
/// Fails only if the length field would not fit in its single byte.
#[inline]
pub fn encode(id: u8, instruction: u8, parameters: &[u8]) -> Result<Vec<u8>, UsageError> {
    let length = parameters.len() + 2;
    let Ok(length_byte) = u8::try_from(length) else {
        return Err(UsageError::FrameTooLong { length });
    };
    let mut frame = Vec::with_capacity(parameters.len() + INSTRUCTION_BASE_LENGTH);
    frame.extend_from_slice(&HEADER);
    frame.extend_from_slice(&[id, length_byte, instruction]);
    frame.extend_from_slice(parameters);
    let checksum = Checksum::over(&frame[HEADER.len()..]);
    frame.push(checksum);
    Ok(frame)
}

/// Frame one instruction for `id`, looking its code up in `instructions`.
#[inline]
pub fn new<Insn: Instruction>(
    instructions: &InstructionSet,
    id: u8,
    instruction: &Insn,
) -> Result<Vec<u8>, UsageError> {
    let () = crate::check_target_id(id)?;
    let mut parameters = Vec::new();
    let () = instruction.parameters(&mut parameters);
    encode(id, instructions.byte(Insn::KIND), &parameters)
}
