use servo_packet::{
    InstructionSet,
    control_table::{GoalPosition, Item},
    packet, send,
};

const ID: u8 = 1;

fn main() -> Result<(), servo_packet::UsageError> {
    let instruction = send::Write {
        address: GoalPosition::ADDRESS,
        data: &512_u16.to_le_bytes(),
    };
    let frame = packet::new(&InstructionSet::PROTOCOL_1, ID, &instruction)?;
    println!("{frame:02X?}");
    Ok(())
}
