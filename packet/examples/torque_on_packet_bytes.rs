use servo_packet::{
    InstructionSet,
    control_table::{GoalPosition, Item, TorqueEnable},
    packet, send,
};

fn main() -> Result<(), servo_packet::UsageError> {
    let instructions = InstructionSet::PROTOCOL_1;

    let torque_on = send::Write {
        address: TorqueEnable::ADDRESS,
        data: &[1],
    };
    println!("torque on, ID 1:  {:02X?}", packet::new(&instructions, 1, &torque_on)?);

    let centre_both = send::SyncWrite::new(
        GoalPosition::ADDRESS,
        [(1, [512_u16, 300]), (2, [512, 300])],
    )?;
    println!(
        "centre IDs 1 & 2: {:02X?}",
        packet::new(&instructions, servo_packet::BROADCAST_ID, &centre_both)?
    );
    Ok(())
}
