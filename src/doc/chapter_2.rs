/*!
# Interrupts

Interrupts are checked before every step of a virtual machine and
serviced one at a time in this order.

| register | raised by                                       | serviced by            |
|----------|-------------------------------------------------|------------------------|
| SI       | a device instruction or `HALT` in a virtual machine | the driver itself  |
| PI       | a fault in a virtual machine                    | handler at word 0      |
| TI       | the timer reaching zero                         | handler at word 1      |
| IOI      | the end of any device transfer                  | handler at word 2      |

A trap is replayed in the real machine with the operand translated to a
real address. The virtual machine then continues after the trapping
instruction.

For the others the driver stores the slot of the interrupted virtual
machine in word 9 and jumps to the handler. The handler runs in
supervisor mode and must end with `STVM`. That clears the interrupt and
returns the real machine to the point where it was interrupted.

A fault while the real machine is in control stops the emulator. So does
an interrupt vector entry that does not point past the vector.

The timer counts down by one for every virtual machine instruction and is
reset to 10 by every `STVM`.
*/
