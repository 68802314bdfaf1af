/*!
# Instruction Set

Every instruction is one word: a mnemonic followed by its digits. Words
shorter than five characters are padded with trailing spaces. The first
mnemonic in the table below that matches the start of a word is used.

| word    | effect                                                  |
|---------|---------------------------------------------------------|
| `CRxyz` | TMP := M\[xyz\]                                         |
| `CMxyz` | M\[xyz\] := TMP                                         |
| `ADxyz` | TMP := TMP + M\[xyz\]                                   |
| `SBxyz` | TMP := TMP - M\[xyz\]                                   |
| `MLxyz` | TMP := TMP * M\[xyz\]                                   |
| `MDxyz` | TMP := TMP % M\[xyz\]                                   |
| `DVxyz` | TMP := TMP / M\[xyz\]                                   |
| `CPxyz` | compare TMP with M\[xyz\] as text, set C                |
| `JPxyz` | IC := xyz                                               |
| `JExyz` | jump if C is EQUAL                                      |
| `JLxyz` | jump if C is LESS                                       |
| `JMxyz` | jump if C is MORE                                       |
| `HALT`  | stop this machine                                       |
| `GDxyz` | M\[xyz\] := word waiting on the keyboard                |
| `PDxyz` | show M\[xyz\] on the screen                             |
| `RDxyz` | M\[xyz..xyz+10\] := external memory block at pointer    |
| `WDxyz` | external memory block at pointer := M\[xyz..xyz+10\]    |
| `SDxyz` | external memory pointer := xyz                          |
| `GTxyz` | M\[xyz\] := TI                                          |
| `PTxyz` | TI := M\[xyz\]                                          |
| `STVMn` | start or resume virtual machine n                       |
| `SVRGn` | save the registers of virtual machine n                 |
| `LDRGn` | load the registers of virtual machine n                 |

Arithmetic works on five digit numbers. A result below zero or above
99999, or a zero divisor, is an overflow.

## Virtual machines

A virtual machine sees 100 words. The hundreds digit of every operand
must be zero. `GD`, `PD`, `RD`, `WD`, `SD` and `HALT` trap to the real
machine; `GT`, `PT`, `STVM`, `SVRG` and `LDRG` are not available and stop
the emulator. Words 98 and 99 of each window receive the saved registers
whenever the machine is suspended, so `GD` into them or an `RD` block
reaching them is an address fault.
*/
